use super::*;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::{Error, ErrorKind};

/// Reads an ESRI ArcGIS ASCII grid. The file opens with a run of
/// `KEYWORD value` header lines; everything after them is whitespace-separated
/// cell values in row-major order, north row first. Grids registered to the
/// lower-left cell corner and to its centre are both accepted. The spelling of
/// the nodata entry decides the element type: a decimal point means
/// floating-point cells.
pub fn read_arcascii(
    file_name: &String,
    configs: &mut RasterConfigs,
    data: &mut Vec<f64>,
) -> Result<(), Error> {
    let f = File::open(file_name)?;
    let reader = BufReader::new(f);

    let mut ncols: Option<usize> = None;
    let mut nrows: Option<usize> = None;
    let mut cellsize: Option<f64> = None;
    let mut xllcorner: Option<f64> = None;
    let mut yllcorner: Option<f64> = None;
    let mut xllcenter: Option<f64> = None;
    let mut yllcenter: Option<f64> = None;
    let mut nodata_entry: Option<String> = None;

    // the header ends at the first line that opens with a number
    let mut in_header = true;
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let starts_with_letter = trimmed
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic());
        if in_header && starts_with_letter {
            let mut fields = trimmed.split_whitespace();
            let key = match fields.next() {
                Some(k) => k.to_lowercase(),
                None => continue,
            };
            let value = fields.next().ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidData,
                    format!("The header entry '{}' in {} has no value.", trimmed, file_name),
                )
            })?;
            match key.as_str() {
                "ncols" => ncols = Some(parse_number(value, trimmed)? as usize),
                "nrows" => nrows = Some(parse_number(value, trimmed)? as usize),
                "cellsize" => cellsize = Some(parse_number(value, trimmed)?),
                "xllcorner" => xllcorner = Some(parse_number(value, trimmed)?),
                "yllcorner" => yllcorner = Some(parse_number(value, trimmed)?),
                "xllcenter" => xllcenter = Some(parse_number(value, trimmed)?),
                "yllcenter" => yllcenter = Some(parse_number(value, trimmed)?),
                "nodata_value" => nodata_entry = Some(value.to_string()),
                _ => {} // unrecognized entries are skipped
            }
        } else {
            if in_header {
                in_header = false;
                data.reserve(nrows.unwrap_or(0) * ncols.unwrap_or(0));
            }
            for token in trimmed.split_whitespace() {
                data.push(parse_number(token, trimmed)?);
            }
        }
    }

    let missing = |entry: &str| {
        Error::new(
            ErrorKind::InvalidData,
            format!("{} is missing the {} header entry.", file_name, entry),
        )
    };
    configs.columns = ncols.ok_or_else(|| missing("NCOLS"))?;
    configs.rows = nrows.ok_or_else(|| missing("NROWS"))?;
    let cellsize = cellsize.ok_or_else(|| missing("CELLSIZE"))?;
    configs.resolution_x = cellsize;
    configs.resolution_y = cellsize;

    match nodata_entry {
        Some(value) => {
            configs.nodata = parse_number(&value, &value)?;
            configs.data_type = if value.contains('.') {
                DataType::F32
            } else {
                DataType::I32
            };
        }
        None => {
            configs.data_type = DataType::F32;
        }
    }

    let (west, south) = match (xllcorner, yllcorner, xllcenter, yllcenter) {
        (Some(x), Some(y), _, _) => (x, y),
        (_, _, Some(x), Some(y)) => (x - 0.5 * cellsize, y - 0.5 * cellsize),
        _ => return Err(missing("XLLCORNER/YLLCORNER")),
    };
    configs.west = west;
    configs.south = south;
    configs.east = west + configs.columns as f64 * cellsize;
    configs.north = south + configs.rows as f64 * cellsize;

    configs.photometric_interp = PhotometricInterpretation::Continuous;

    Ok(())
}

fn parse_number(text: &str, line: &str) -> Result<f64, Error> {
    text.parse::<f64>().map_err(|_| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Could not parse '{}' as a number in: {}", text, line),
        )
    })
}

/// Writes an ESRI ArcGIS ASCII grid: the corner-registered header followed by
/// one line of cell values per raster row. Floating-point rasters are written
/// with two decimal places; integral rasters, such as flow pointers and
/// watershed labels, without any.
pub fn write_arcascii<'a>(r: &'a mut Raster) -> Result<(), Error> {
    let columns = r.configs.columns;
    if columns == 0 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "Cannot write a raster with no columns.",
        ));
    }

    let f = File::create(&r.file_name)?;
    let mut writer = BufWriter::new(f);

    let decimals = if r.configs.data_type.is_float() { 2 } else { 0 };

    writeln!(writer, "NCOLS {}", columns)?;
    writeln!(writer, "NROWS {}", r.configs.rows)?;
    writeln!(writer, "XLLCORNER {}", r.configs.west)?;
    writeln!(writer, "YLLCORNER {}", r.configs.south)?;
    writeln!(
        writer,
        "CELLSIZE {}",
        (r.configs.resolution_x + r.configs.resolution_y) / 2.0
    )?;
    writeln!(writer, "NODATA_VALUE {:.*}", decimals, r.configs.nodata)?;

    let mut row_values: Vec<String> = Vec::with_capacity(columns);
    for row in r.data.chunks(columns) {
        row_values.clear();
        for value in row {
            row_values.push(format!("{:.*}", decimals, value));
        }
        writeln!(writer, "{}", row_values.join(" "))?;
    }

    writer.flush()?;

    Ok(())
}
