/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 14/03/2023
Last Modified: 02/05/2025
License: MIT
*/

mod arcascii_raster;
mod whitebox_raster;

use self::arcascii_raster::*;
use self::whitebox_raster::*;
use crate::structures::Array2D;
use crate::utils::Endianness;
use num_traits::cast::AsPrimitive;
use std::default::Default;
use std::f64;
use std::io::Error;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

/// An in-memory raster that abstracts over the supported file formats: ArcGIS
/// ASCII grids and two-file Whitebox GAT binary rasters. Pixel values are held
/// as `f64` regardless of the file's element type; the element type recorded in
/// `configs.data_type` decides which concrete grid type the tools hand to the
/// flood algorithms, and how the payload is written back out.
///
/// Examples:
///
/// ```ignore
/// // Read an existing raster file
/// let input = Raster::new(&input_file, "r")?;
///
/// // Create a new raster holding the cells of a processed grid
/// let output = Raster::initialize_using_array2d(&output_file, &input.configs, filled);
/// ```
#[derive(Default, Clone)]
pub struct Raster {
    pub file_name: String,
    pub file_mode: String,
    pub raster_type: RasterType,
    pub configs: RasterConfigs,
    pub(crate) data: Vec<f64>,
}

impl Raster {
    /// Creates an in-memory `Raster` object. The data are either read from an
    /// existing file (`file_name`; `file_mode` is 'r') or prepared for new file
    /// creation (`file_mode` is 'w'). The raster format is determined by the file
    /// extension of the `file_name` string.
    pub fn new<'a>(file_name: &'a str, file_mode: &'a str) -> Result<Raster, Error> {
        let fm: String = file_mode.to_lowercase();
        let mut r = Raster {
            file_name: file_name.to_string(),
            file_mode: fm.clone(),
            raster_type: get_raster_type_from_file(file_name.to_string()),
            ..Default::default()
        };
        if r.file_mode.contains("r") {
            match r.raster_type {
                RasterType::ArcAscii => {
                    read_arcascii(&r.file_name, &mut r.configs, &mut r.data)?;
                }
                RasterType::Whitebox => {
                    read_whitebox(&r.file_name, &mut r.configs, &mut r.data)?;
                }
                RasterType::Unknown => {
                    return Err(Error::new(ErrorKind::Other, "Unrecognized raster type"));
                }
            }
            if r.data.len() != r.configs.rows * r.configs.columns {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!(
                        "The file {} does not contain {} rows x {} columns of data.",
                        r.file_name, r.configs.rows, r.configs.columns
                    ),
                ));
            }
        }
        Ok(r)
    }

    /// Creates a new in-memory `Raster` carrying the cells of `data`, with grid
    /// extent and location based on `configs`. The nodata value is taken from the
    /// array; the caller is expected to set the output's `data_type` afterwards
    /// if it differs from the input's.
    pub fn initialize_using_array2d<'a, T: AsPrimitive<f64> + Copy>(
        file_name: &'a str,
        configs: &'a RasterConfigs,
        data: Array2D<T>,
    ) -> Raster {
        let mut output = Raster {
            file_name: file_name.to_string(),
            file_mode: "w".to_string(),
            raster_type: get_raster_type_from_file(file_name.to_string()),
            ..Default::default()
        };
        output.configs.rows = configs.rows;
        output.configs.columns = configs.columns;
        output.configs.north = configs.north;
        output.configs.south = configs.south;
        output.configs.east = configs.east;
        output.configs.west = configs.west;
        output.configs.resolution_x = configs.resolution_x;
        output.configs.resolution_y = configs.resolution_y;
        output.configs.nodata = data.nodata().as_();
        output.configs.data_type = configs.data_type;
        output.configs.photometric_interp = configs.photometric_interp;
        output.configs.palette = configs.palette.clone();
        output.configs.projection = configs.projection.clone();
        output.configs.xy_units = configs.xy_units.clone();
        output.configs.z_units = configs.z_units.clone();
        output.configs.endian = configs.endian;
        output
            .data
            .reserve_exact(output.configs.rows * output.configs.columns);
        for row in 0..output.configs.rows as isize {
            for col in 0..output.configs.columns as isize {
                output.data.push(data.get_value(row, col).as_());
            }
        }
        output
    }

    /// Returns the value contained within the grid cell specified by `row` and
    /// `column`. Addresses outside of the grid return the nodata value.
    pub fn get_value(&self, row: isize, column: isize) -> f64 {
        if column >= 0
            && row >= 0
            && column < self.configs.columns as isize
            && row < self.configs.rows as isize
        {
            let idx: usize = row as usize * self.configs.columns + column as usize;
            return self.data[idx];
        }
        self.configs.nodata
    }

    /// Extracts the payload as a grid of the concrete element type `T`. Cells
    /// holding the nodata value map onto `T`'s rendering of it exactly, so the
    /// nodata value must be representable in `T`.
    pub fn to_cell_array2d<T>(&self) -> Result<Array2D<T>, Error>
    where
        T: Copy + 'static,
        f64: AsPrimitive<T>,
    {
        let nodata = self.configs.nodata;
        let out_nodata: T = nodata.as_();
        let mut data: Array2D<T> = Array2D::new(
            self.configs.rows as isize,
            self.configs.columns as isize,
            out_nodata,
            out_nodata,
        )?;
        let mut z: f64;
        for row in 0..self.configs.rows as isize {
            for col in 0..self.configs.columns as isize {
                z = self.get_value(row, col);
                if z != nodata {
                    data.set_value(row, col, z.as_());
                }
            }
        }
        Ok(data)
    }

    /// Refreshes `configs.minimum` and `configs.maximum` from the payload,
    /// ignoring nodata cells. The scan is split across the machine's cores.
    pub fn update_min_max(&mut self) {
        self.configs.minimum = f64::INFINITY;
        self.configs.maximum = f64::NEG_INFINITY;
        let num_procs = num_cpus::get();
        let nodata = self.configs.nodata;
        let values = Arc::new(self.data.clone());
        let (tx, rx) = mpsc::channel();
        for tid in 0..num_procs {
            let values = values.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                let mut min_val = f64::INFINITY;
                let mut max_val = f64::NEG_INFINITY;
                let mut value: f64;
                for i in (0..values.len()).filter(|v| v % num_procs == tid) {
                    value = values[i];
                    if value != nodata {
                        if value < min_val {
                            min_val = value;
                        }
                        if value > max_val {
                            max_val = value;
                        }
                    }
                }
                tx.send((min_val, max_val)).unwrap();
            });
        }

        for _ in 0..num_procs {
            let (min_val, max_val) = rx.recv().expect("Error receiving data from thread.");
            if min_val < self.configs.minimum {
                self.configs.minimum = min_val;
            }
            if max_val > self.configs.maximum {
                self.configs.maximum = max_val;
            }
        }

        if self.configs.display_min == f64::INFINITY {
            self.configs.display_min = self.configs.minimum;
        }
        if self.configs.display_max == f64::NEG_INFINITY {
            self.configs.display_max = self.configs.maximum;
        }
    }

    pub fn add_metadata_entry(&mut self, value: String) {
        self.configs.metadata.push(value);
    }

    /// Writes the raster to disk in the format implied by its file name.
    pub fn write(&mut self) -> Result<(), Error> {
        if !self.file_mode.contains("w") {
            return Err(Error::new(
                ErrorKind::Other,
                "Cannot write raster that is not created in write mode ('w').",
            ));
        }
        match self.raster_type {
            RasterType::ArcAscii => {
                write_arcascii(self)?;
            }
            RasterType::Whitebox => {
                write_whitebox(self)?;
            }
            RasterType::Unknown => {
                return Err(Error::new(ErrorKind::Other, "Unrecognized raster type"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RasterType {
    Unknown,
    ArcAscii,
    Whitebox,
}

impl Default for RasterType {
    fn default() -> RasterType {
        RasterType::Unknown
    }
}

fn get_raster_type_from_file(file_name: String) -> RasterType {
    let extension: String = match Path::new(&file_name).extension() {
        Some(ext) => ext.to_str().unwrap_or("").to_lowercase(),
        None => String::new(),
    };
    if extension == "tas" || extension == "dep" {
        return RasterType::Whitebox;
    }
    if extension == "asc" || extension == "txt" {
        return RasterType::ArcAscii;
    }
    RasterType::Unknown
}

#[derive(Debug, Clone)]
pub struct RasterConfigs {
    pub rows: usize,
    pub columns: usize,
    pub bands: u8,
    pub nodata: f64,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub resolution_x: f64,
    pub resolution_y: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub display_min: f64,
    pub display_max: f64,
    pub palette: String,
    pub projection: String,
    pub endian: Endianness,
    pub photometric_interp: PhotometricInterpretation,
    pub data_type: DataType,
    pub palette_nonlinearity: f64,
    pub z_units: String,
    pub xy_units: String,
    pub metadata: Vec<String>,
}

impl Default for RasterConfigs {
    fn default() -> RasterConfigs {
        RasterConfigs {
            rows: 0,
            columns: 0,
            bands: 1,
            nodata: -32768.0,
            north: f64::NEG_INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            west: f64::INFINITY,
            resolution_x: f64::NEG_INFINITY,
            resolution_y: f64::NEG_INFINITY,
            minimum: f64::INFINITY,
            maximum: f64::NEG_INFINITY,
            display_min: f64::INFINITY,
            display_max: f64::NEG_INFINITY,
            palette: "not specified".to_string(),
            projection: "not specified".to_string(),
            endian: Endianness::LittleEndian,
            photometric_interp: PhotometricInterpretation::Unknown,
            data_type: DataType::Unknown,
            palette_nonlinearity: 1.0,
            z_units: "not specified".to_string(),
            xy_units: "not specified".to_string(),
            metadata: vec![],
        }
    }
}

/// The element type a raster file stores, and hence the concrete grid type the
/// flood algorithms are monomorphized over when the raster is processed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DataType {
    F64,
    F32,
    I32,
    I16,
    I8,
    U32,
    U16,
    U8,
    Unknown,
}

impl Default for DataType {
    fn default() -> DataType {
        DataType::Unknown
    }
}

impl DataType {
    pub fn is_float(&self) -> bool {
        match *self {
            DataType::F64 | DataType::F32 => true,
            _ => false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PhotometricInterpretation {
    Continuous,
    Categorical,
    Boolean,
    Unknown,
}

impl Default for PhotometricInterpretation {
    fn default() -> PhotometricInterpretation {
        PhotometricInterpretation::Unknown
    }
}

#[cfg(test)]
mod test {
    use super::{DataType, Raster, RasterConfigs, RasterType};
    use crate::structures::Array2D;
    use std::env;
    use std::fs;

    #[test]
    fn test_raster_type_from_extension() {
        use super::get_raster_type_from_file;
        assert_eq!(get_raster_type_from_file("dem.asc".to_string()), RasterType::ArcAscii);
        assert_eq!(get_raster_type_from_file("dem.txt".to_string()), RasterType::ArcAscii);
        assert_eq!(get_raster_type_from_file("dem.dep".to_string()), RasterType::Whitebox);
        assert_eq!(get_raster_type_from_file("dem.tas".to_string()), RasterType::Whitebox);
        assert_eq!(get_raster_type_from_file("dem.tif".to_string()), RasterType::Unknown);
        assert_eq!(get_raster_type_from_file("dem".to_string()), RasterType::Unknown);
    }

    #[test]
    fn test_typed_extraction_round_trip() {
        let mut configs = RasterConfigs::default();
        configs.rows = 2;
        configs.columns = 3;
        configs.nodata = -1.0;
        configs.data_type = DataType::I16;
        let mut grid: Array2D<i16> = Array2D::new(2, 3, 0, -1).unwrap();
        grid.set_value(0, 0, 12);
        grid.set_value(1, 2, -1);
        let r = Raster::initialize_using_array2d("out.asc", &configs, grid);
        assert_eq!(r.configs.nodata, -1.0);
        assert_eq!(r.get_value(0, 0), 12.0);
        assert_eq!(r.get_value(1, 2), -1.0);
        assert_eq!(r.get_value(5, 5), -1.0); // off-grid reads give nodata
        let back: Array2D<i16> = r.to_cell_array2d().unwrap();
        assert_eq!(back.get_value(0, 0), 12);
        assert_eq!(back.get_value(1, 2), -1);
    }

    #[test]
    fn test_update_min_max_skips_nodata() {
        let mut configs = RasterConfigs::default();
        configs.rows = 2;
        configs.columns = 2;
        configs.nodata = -32768.0;
        let mut grid: Array2D<f64> = Array2D::new(2, 2, 5.0, -32768.0).unwrap();
        grid.set_value(0, 1, 11.0);
        grid.set_value(1, 0, -32768.0);
        let mut r = Raster::initialize_using_array2d("out.asc", &configs, grid);
        r.update_min_max();
        assert_eq!(r.configs.minimum, 5.0);
        assert_eq!(r.configs.maximum, 11.0);
    }

    #[test]
    fn test_arcascii_write_read_round_trip() {
        let mut configs = RasterConfigs::default();
        configs.rows = 2;
        configs.columns = 3;
        configs.nodata = -9999.0;
        configs.north = 2.0;
        configs.south = 0.0;
        configs.east = 3.0;
        configs.west = 0.0;
        configs.resolution_x = 1.0;
        configs.resolution_y = 1.0;
        configs.data_type = DataType::F32;
        let mut grid: Array2D<f32> = Array2D::new(2, 3, 1.5, -9999.0).unwrap();
        grid.set_value(1, 1, -9999.0);
        grid.set_value(0, 2, 7.25);

        let file = env::temp_dir().join("flood_tools_round_trip.asc");
        let file_name = file.to_str().unwrap().to_string();
        let mut out = Raster::initialize_using_array2d(&file_name, &configs, grid);
        out.write().unwrap();

        let input = Raster::new(&file_name, "r").unwrap();
        assert_eq!(input.configs.rows, 2);
        assert_eq!(input.configs.columns, 3);
        assert_eq!(input.configs.nodata, -9999.0);
        assert_eq!(input.get_value(0, 0), 1.5);
        assert_eq!(input.get_value(0, 2), 7.25);
        assert_eq!(input.get_value(1, 1), -9999.0);
        let _ = fs::remove_file(file);
    }

    #[test]
    fn test_whitebox_write_read_round_trip() {
        let mut configs = RasterConfigs::default();
        configs.rows = 3;
        configs.columns = 2;
        configs.nodata = -32768.0;
        configs.north = 3.0;
        configs.south = 0.0;
        configs.east = 2.0;
        configs.west = 0.0;
        configs.resolution_x = 1.0;
        configs.resolution_y = 1.0;
        configs.data_type = DataType::F64;
        let mut grid: Array2D<f64> = Array2D::new(3, 2, 0.0, -32768.0).unwrap();
        grid.set_value(0, 0, 101.125);
        grid.set_value(2, 1, -32768.0);
        grid.set_value(1, 1, -4.5);

        let file = env::temp_dir().join("flood_tools_round_trip.dep");
        let file_name = file.to_str().unwrap().to_string();
        let mut out = Raster::initialize_using_array2d(&file_name, &configs, grid);
        out.write().unwrap();

        let input = Raster::new(&file_name, "r").unwrap();
        assert_eq!(input.configs.rows, 3);
        assert_eq!(input.configs.columns, 2);
        assert_eq!(input.configs.data_type, DataType::F64);
        assert_eq!(input.get_value(0, 0), 101.125);
        assert_eq!(input.get_value(1, 1), -4.5);
        assert_eq!(input.get_value(2, 1), -32768.0);
        let _ = fs::remove_file(env::temp_dir().join("flood_tools_round_trip.dep"));
        let _ = fs::remove_file(env::temp_dir().join("flood_tools_round_trip.tas"));
    }
}
