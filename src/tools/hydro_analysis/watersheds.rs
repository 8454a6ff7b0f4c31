/*
This tool is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 09/05/2023
Last Modified: 02/05/2025
License: MIT
*/

use crate::algorithms::{priority_flood_watersheds, CellValue, FloodStats};
use crate::raster::*;
use crate::structures::Array2D;
use crate::tools::*;
use num_traits::AsPrimitive;
use std::env;
use std::io::{Error, ErrorKind};
use std::path;

/// This tool partitions a raw DEM into watersheds by flooding inward from the grid edges.
/// As each unclaimed cell surfaces from the flood it is given the label of the cell that
/// drained it; a cell that surfaces unclaimed, either on the grid edge or against an
/// interior region of NoData, begins a new watershed, with labels numbered upward from 1.
/// Cells sharing a label therefore drain to a common outlet. NoData cells are written as
/// `-1` in the output and never carry a label.
///
/// The DEM is read but not modified.
///
/// # Reference
/// Barnes, R., Lehman, C., and Mulla, D. 2014. Priority-flood: An optimal depression-filling and
/// watershed-labeling algorithm for digital elevation models. Computers & Geosciences, 62: 117-127.
///
/// # See Also
/// `FloodFlowDirections`, `PitMask`
pub struct Watersheds {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl Watersheds {
    pub fn new() -> Watersheds {
        // public constructor
        let name = "Watersheds".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Partitions a DEM into watershed drainage areas, labelled outward from their outlets."
                .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input DEM File".to_owned(),
            flags: vec!["-i".to_owned(), "--dem".to_owned()],
            description: "Input raster DEM file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output raster file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let e = format!("{}", env::current_exe().unwrap().display());
        let mut parent = env::current_exe().unwrap();
        parent.pop();
        let p = format!("{}", parent.display());
        let mut short_exe = e
            .replace(&p, "")
            .replace(".exe", "")
            .replace(".", "")
            .replace(&sep, "");
        if e.contains(".exe") {
            short_exe += ".exe";
        }
        let usage = format!(
            ">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --dem=DEM.dep -o=output.dep",
            short_exe, name
        )
        .replace("*", &sep);

        Watersheds {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }

    fn label<T>(&self, input: &Raster) -> Result<(Array2D<i32>, FloodStats), Error>
    where
        T: CellValue + AsPrimitive<f64>,
        f64: AsPrimitive<T>,
    {
        let mut dem = input.to_cell_array2d::<T>()?;
        priority_flood_watersheds(&mut dem, false)
    }
}

impl FloodTool for Watersheds {
    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        match serde_json::to_string(&self.parameters) {
            Ok(json_str) => return format!("{{\"parameters\":{}}}", json_str),
            Err(err) => return format!("{:?}", err),
        }
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error> {
        let mut input_file = String::new();
        let mut output_file = String::new();

        if args.len() == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters.",
            ));
        }
        for i in 0..args.len() {
            let mut arg = args[i].replace("\"", "");
            arg = arg.replace("\'", "");
            let cmd = arg.split("="); // in case an equals sign was used
            let vec = cmd.collect::<Vec<&str>>();
            let mut keyval = false;
            if vec.len() > 1 {
                keyval = true;
            }
            let flag_val = vec[0].to_lowercase().replace("--", "-");
            if flag_val == "-i" || flag_val == "-input" || flag_val == "-dem" {
                input_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            }
        }

        if verbose {
            let tool_name = self.get_tool_name();
            let welcome_len = format!("* Welcome to {} *", tool_name).len().max(25);
            // 25 = length of the 'Powered by' statement.
            println!("{}", "*".repeat(welcome_len));
            println!("* Welcome to {} {}*", tool_name, " ".repeat(welcome_len - 15 - tool_name.len()));
            println!("* Powered by FloodTools {}*", " ".repeat(welcome_len - 25));
            println!("{}", "*".repeat(welcome_len));
        }

        let sep: String = path::MAIN_SEPARATOR.to_string();

        if !input_file.contains(&sep) && !input_file.contains("/") {
            input_file = format!("{}{}", working_directory, input_file);
        }
        if !output_file.contains(&sep) && !output_file.contains("/") {
            output_file = format!("{}{}", working_directory, output_file);
        }

        if verbose {
            println!("Reading data...")
        };

        let input = Raster::new(&input_file, "r")?;

        let start = Instant::now();

        let (labels, stats) = match input.configs.data_type {
            DataType::U8 => self.label::<u8>(&input)?,
            DataType::U16 => self.label::<u16>(&input)?,
            DataType::I16 => self.label::<i16>(&input)?,
            DataType::U32 => self.label::<u32>(&input)?,
            DataType::I32 => self.label::<i32>(&input)?,
            DataType::F32 => self.label::<f32>(&input)?,
            DataType::F64 => self.label::<f64>(&input)?,
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    "The input raster's data type is unsupported.",
                ));
            }
        };

        if verbose {
            println!("{} cells processed.", stats.cells_processed);
        }

        let mut output = Raster::initialize_using_array2d(&output_file, &input.configs, labels);
        let elapsed_time = get_formatted_elapsed_time(start);
        output.configs.data_type = DataType::I32;
        output.configs.palette = "qual.plt".to_string();
        output.configs.photometric_interp = PhotometricInterpretation::Categorical;
        output.add_metadata_entry(format!(
            "Created by flood_tools' {} tool",
            self.get_tool_name()
        ));
        output.add_metadata_entry(format!("Input file: {}", input_file));
        output.add_metadata_entry(format!("Elapsed Time (excluding I/O): {}", elapsed_time));

        if verbose {
            println!("Saving data...")
        };
        let _ = match output.write() {
            Ok(_) => {
                if verbose {
                    println!("Output file written")
                }
            }
            Err(e) => return Err(e),
        };
        if verbose {
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
        }

        Ok(())
    }
}
