use super::*;
use crate::utils::{ByteOrderReader, ByteOrderWriter, Endianness};
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Error;
use std::io::ErrorKind;

pub fn read_whitebox(
    file_name: &String,
    configs: &mut RasterConfigs,
    data: &mut Vec<f64>,
) -> Result<(), Error> {
    // read the header file
    let header_file = file_name.replace(".tas", ".dep");
    let f = File::open(header_file)?;
    let f = BufReader::new(f);

    for line in f.lines() {
        let line_unwrapped = line?;
        let vec = line_unwrapped.split(":").collect::<Vec<&str>>();
        if vec.len() < 2 {
            continue;
        }
        let key = vec[0].to_lowercase();
        let value = vec[1].trim().to_string();
        if key.contains("rows") {
            configs.rows = value.parse::<usize>().unwrap();
        } else if key.contains("col") {
            configs.columns = value.parse::<usize>().unwrap();
        } else if key.contains("stacks") {
            configs.bands = value.parse::<u8>().unwrap();
        } else if key.contains("north") {
            configs.north = value.parse::<f64>().unwrap();
        } else if key.contains("south") {
            configs.south = value.parse::<f64>().unwrap();
        } else if key.contains("east") {
            configs.east = value.parse::<f64>().unwrap();
        } else if key.contains("west") {
            configs.west = value.parse::<f64>().unwrap();
        } else if key.contains("display min") {
            configs.display_min = value.parse::<f64>().unwrap();
        } else if key.contains("display max") {
            configs.display_max = value.parse::<f64>().unwrap();
        } else if key.contains("min") && !key.contains("display") {
            configs.minimum = value.parse::<f64>().unwrap();
        } else if key.contains("max") && !key.contains("display") {
            configs.maximum = value.parse::<f64>().unwrap();
        } else if key.contains("data type") {
            configs.data_type = parse_data_type(&value)?;
        } else if key.contains("data scale") {
            let value_lc = value.to_lowercase();
            if value_lc.contains("continuous") {
                configs.photometric_interp = PhotometricInterpretation::Continuous;
            } else if value_lc.contains("categorical") {
                configs.photometric_interp = PhotometricInterpretation::Categorical;
            } else if value_lc.contains("boolean") {
                configs.photometric_interp = PhotometricInterpretation::Boolean;
            }
        } else if key.contains("z units") {
            configs.z_units = value;
        } else if key.contains("xy units") {
            configs.xy_units = value;
        } else if key.contains("projection") {
            configs.projection = value;
        } else if key.contains("nodata") {
            configs.nodata = value.parse::<f64>().unwrap();
        } else if key.contains("preferred palette") {
            configs.palette = value;
        } else if key.contains("nonlinearity") {
            configs.palette_nonlinearity = value.parse::<f64>().unwrap();
        } else if key.contains("byte order") {
            configs.endian = Endianness::from_str(&value);
        } else if key.contains("metadata") {
            configs.metadata.push(value);
        }
    }

    configs.resolution_x = (configs.east - configs.west) / configs.columns as f64;
    configs.resolution_y = (configs.north - configs.south) / configs.rows as f64;

    // read the data file
    let data_file = file_name.replace(".dep", ".tas");
    let f = File::open(data_file)?;
    let mut reader = ByteOrderReader::new(BufReader::new(f), configs.endian);

    let num_cells = configs.rows * configs.columns;
    data.reserve(num_cells);
    match configs.data_type {
        DataType::F64 => {
            for _ in 0..num_cells {
                data.push(reader.read_f64()?);
            }
        }
        DataType::F32 => {
            for _ in 0..num_cells {
                data.push(reader.read_f32()? as f64);
            }
        }
        DataType::I32 => {
            for _ in 0..num_cells {
                data.push(reader.read_i32()? as f64);
            }
        }
        DataType::I16 => {
            for _ in 0..num_cells {
                data.push(reader.read_i16()? as f64);
            }
        }
        DataType::I8 => {
            for _ in 0..num_cells {
                data.push(reader.read_i8()? as f64);
            }
        }
        DataType::U32 => {
            for _ in 0..num_cells {
                data.push(reader.read_u32()? as f64);
            }
        }
        DataType::U16 => {
            for _ in 0..num_cells {
                data.push(reader.read_u16()? as f64);
            }
        }
        DataType::U8 => {
            for _ in 0..num_cells {
                data.push(reader.read_u8()? as f64);
            }
        }
        DataType::Unknown => {
            return Err(Error::new(ErrorKind::NotFound, "Raster data type is unknown."));
        }
    }

    Ok(())
}

/// Parses the `Data Type` header entry. Complex-valued rasters are recognized
/// and rejected rather than silently misread.
fn parse_data_type(value: &str) -> Result<DataType, Error> {
    let value_lc = value.to_lowercase();
    if value_lc.contains("cint16")
        || value_lc.contains("cint32")
        || value_lc.contains("cfloat32")
        || value_lc.contains("cfloat64")
    {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "Complex types are unsupported.",
        ));
    }
    let dt = if value_lc.contains("double") {
        DataType::F64
    } else if value_lc.contains("float") {
        DataType::F32
    } else if value_lc.contains("i32") {
        DataType::I32
    } else if value_lc.contains("u32") {
        DataType::U32
    } else if value_lc.contains("u16") {
        DataType::U16
    } else if value_lc.contains("i8") {
        DataType::I8
    } else if value_lc.contains("integer") || value_lc.contains("i16") {
        DataType::I16
    } else if value_lc.contains("byte") || value_lc.contains("u8") {
        DataType::U8
    } else {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("Unrecognised data type: {}", value),
        ));
    };
    Ok(dt)
}

pub fn write_whitebox<'a>(r: &'a mut Raster) -> Result<(), Error> {
    r.update_min_max();

    // Save the header file
    let header_file = r.file_name.replace(".tas", ".dep");
    let f = File::create(header_file)?;
    let mut writer = BufWriter::new(f);

    let s = format!("Min:\t{}\n", r.configs.minimum);
    writer.write_all(s.as_bytes())?;

    let s = format!("Max:\t{}\n", r.configs.maximum);
    writer.write_all(s.as_bytes())?;

    let s = format!("North:\t{}\n", r.configs.north);
    writer.write_all(s.as_bytes())?;

    let s = format!("South:\t{}\n", r.configs.south);
    writer.write_all(s.as_bytes())?;

    let s = format!("East:\t{}\n", r.configs.east);
    writer.write_all(s.as_bytes())?;

    let s = format!("West:\t{}\n", r.configs.west);
    writer.write_all(s.as_bytes())?;

    let s = format!("Cols:\t{}\n", r.configs.columns);
    writer.write_all(s.as_bytes())?;

    let s = format!("Rows:\t{}\n", r.configs.rows);
    writer.write_all(s.as_bytes())?;

    let s = format!("Stacks:\t{}\n", r.configs.bands);
    writer.write_all(s.as_bytes())?;

    let data_type = match r.configs.data_type {
        DataType::F64 => "DOUBLE",
        DataType::F32 => "FLOAT",
        DataType::I32 => "i32",
        DataType::I16 => "INTEGER",
        DataType::I8 => "i8",
        DataType::U32 => "u32",
        DataType::U16 => "u16",
        DataType::U8 => "BYTE",
        DataType::Unknown => {
            return Err(Error::new(
                ErrorKind::NotFound,
                "Raster Data Type not specified.",
            ));
        }
    };
    let s = format!("Data Type:\t{}\n", data_type);
    writer.write_all(s.as_bytes())?;

    let s = format!("Z Units:\t{}\n", r.configs.z_units);
    writer.write_all(s.as_bytes())?;

    let s = format!("XY Units:\t{}\n", r.configs.xy_units);
    writer.write_all(s.as_bytes())?;

    let s = format!("Projection:\t{}\n", r.configs.projection);
    writer.write_all(s.as_bytes())?;

    match r.configs.photometric_interp {
        PhotometricInterpretation::Categorical => {
            writer.write_all("Data Scale:\tcategorical\n".as_bytes())?;
        }
        PhotometricInterpretation::Boolean => {
            writer.write_all("Data Scale:\tBoolean\n".as_bytes())?;
        }
        PhotometricInterpretation::Continuous | PhotometricInterpretation::Unknown => {
            writer.write_all("Data Scale:\tcontinuous\n".as_bytes())?;
        }
    }

    let s = format!("Display Min:\t{}\n", r.configs.display_min);
    writer.write_all(s.as_bytes())?;

    let s = format!("Display Max:\t{}\n", r.configs.display_max);
    writer.write_all(s.as_bytes())?;

    let s = format!("Preferred Palette:\t{}\n", r.configs.palette);
    writer.write_all(s.as_bytes())?;

    let s = format!("NoData:\t{}\n", r.configs.nodata);
    writer.write_all(s.as_bytes())?;

    if r.configs.endian == Endianness::LittleEndian {
        writer.write_all("Byte Order:\tLITTLE_ENDIAN\n".as_bytes())?;
    } else {
        writer.write_all("Byte Order:\tBIG_ENDIAN\n".as_bytes())?;
    }

    if r.configs.palette_nonlinearity < 0.0 {
        r.configs.palette_nonlinearity = 1.0;
    }
    let s = format!("Palette Nonlinearity:\t{}\n", r.configs.palette_nonlinearity);
    writer.write_all(s.as_bytes())?;

    for md in &r.configs.metadata {
        let s = format!("Metadata Entry:\t{}\n", md.replace(":", ";"));
        writer.write_all(s.as_bytes())?;
    }

    writer.flush()?;

    // write the data file
    let data_file = r.file_name.replace(".dep", ".tas");
    let f = File::create(&data_file)?;
    let mut writer = ByteOrderWriter::new(BufWriter::new(f), r.configs.endian);

    let num_cells: usize = r.configs.rows * r.configs.columns;
    match r.configs.data_type {
        DataType::F64 => {
            for i in 0..num_cells {
                writer.write_f64(r.data[i])?;
            }
        }
        DataType::F32 => {
            for i in 0..num_cells {
                writer.write_f32(r.data[i] as f32)?;
            }
        }
        DataType::I32 => {
            for i in 0..num_cells {
                writer.write_i32(r.data[i] as i32)?;
            }
        }
        DataType::I16 => {
            for i in 0..num_cells {
                writer.write_i16(r.data[i] as i16)?;
            }
        }
        DataType::I8 => {
            for i in 0..num_cells {
                writer.write_i8(r.data[i] as i8)?;
            }
        }
        DataType::U32 => {
            for i in 0..num_cells {
                writer.write_u32(r.data[i] as u32)?;
            }
        }
        DataType::U16 => {
            for i in 0..num_cells {
                writer.write_u16(r.data[i] as u16)?;
            }
        }
        DataType::U8 => {
            for i in 0..num_cells {
                writer.write_u8(r.data[i] as u8)?;
            }
        }
        DataType::Unknown => {
            return Err(Error::new(ErrorKind::NotFound, "Raster data type is unknown."));
        }
    }

    writer.flush()?;

    Ok(())
}
