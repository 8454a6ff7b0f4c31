/*
This tool is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 21/03/2023
Last Modified: 18/11/2024
License: MIT
*/

use crate::algorithms::{priority_flood_flowdirs, CellValue, FloodStats};
use crate::raster::*;
use crate::structures::Array2D;
use crate::tools::*;
use num_traits::AsPrimitive;
use std::env;
use std::io::{Error, ErrorKind};
use std::path;

/// This tool produces a D8 flow-pointer raster directly from a raw DEM by flooding inward
/// from the grid edges, after Metz, Mitasova and Harmon (2011). Because each cell's
/// direction points at the neighbour that drained first, depressions are implicitly carved
/// through to their outlets and no fill step is needed beforehand; the input DEM is read
/// but never modified.
///
/// Directions use the numeric ring convention
///
/// | .  |  .  |  . |
/// |:--:|:---:|:--:|
/// | 2  |  3  | 4  |
/// | 1  |  0  | 5  |
/// | 8  |  7  | 6  |
///
/// with `-1` written to cells lacking terrain. Cells along the grid edge point off the
/// grid. Ties between equal-elevation donors resolve the same way on every run: the
/// frontier breaks ties first-in, first-out and neighbours are swept cardinals before
/// diagonals, so cardinal donors win.
///
/// # Reference
/// Metz, M., Mitasova, H., and Harmon, R. S. 2011. Efficient extraction of drainage
/// networks from massive, radar-based elevation models with least cost path search.
/// Hydrology and Earth System Sciences, 15(2): 667-678.
///
/// # See Also
/// `FillDepressionsEpsilon`, `Watersheds`
pub struct FloodFlowDirections {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FloodFlowDirections {
    pub fn new() -> FloodFlowDirections {
        // public constructor
        let name = "FloodFlowDirections".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Calculates a D8 flow pointer raster from a raw DEM by flooding inwards from the grid edges."
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

        FloodFlowDirections {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }

    fn flow_dirs<T>(&self, input: &Raster) -> Result<(Array2D<i8>, FloodStats), Error>
    where
        T: CellValue + AsPrimitive<f64>,
        f64: AsPrimitive<T>,
    {
        let dem = input.to_cell_array2d::<T>()?;
        priority_flood_flowdirs(&dem)
    }
}

impl FloodTool for FloodFlowDirections {
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

        let (flowdirs, stats) = match input.configs.data_type {
            DataType::U8 => self.flow_dirs::<u8>(&input)?,
            DataType::U16 => self.flow_dirs::<u16>(&input)?,
            DataType::I16 => self.flow_dirs::<i16>(&input)?,
            DataType::U32 => self.flow_dirs::<u32>(&input)?,
            DataType::I32 => self.flow_dirs::<i32>(&input)?,
            DataType::F32 => self.flow_dirs::<f32>(&input)?,
            DataType::F64 => self.flow_dirs::<f64>(&input)?,
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

        let mut output = Raster::initialize_using_array2d(&output_file, &input.configs, flowdirs);
        let elapsed_time = get_formatted_elapsed_time(start);
        output.configs.data_type = DataType::I8;
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
