/*
This tool is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 21/03/2023
Last Modified: 02/05/2025
License: MIT
*/

use crate::algorithms::{priority_flood_epsilon, FloodStats, NextAfter};
use crate::raster::*;
use crate::tools::*;
use num_traits::AsPrimitive;
use std::env;
use std::io::{Error, ErrorKind};
use std::path;

/// This tool fills the depressions in a DEM while imposing a drainage gradient across the
/// filled surfaces, so that every grid cell lies on a strictly descending flow path to the
/// grid edge. Plain depression filling leaves large flat surfaces on which D8 flow
/// directions are undefined; this variant raises each flooded cell one representable
/// floating-point increment above the cell it drains through, the smallest gradient the
/// element type can express.
///
/// The increment is the exact IEEE-754 successor of the donor cell's elevation, which on
/// `float` DEMs of low relief can accumulate past terrain that was never inside a
/// depression. Cells overtaken this way are counted and reported as a warning; the count
/// is the signal that the DEM should be processed in 64-bit precision instead. For this
/// reason integer DEMs are promoted to 64-bit floating point on output, while
/// floating-point inputs keep their storage type.
///
/// # Reference
/// Barnes, R., Lehman, C., and Mulla, D. 2014. Priority-flood: An optimal depression-filling and
/// watershed-labeling algorithm for digital elevation models. Computers & Geosciences, 62: 117-127.
///
/// # See Also
/// `FillDepressions`, `FloodFlowDirections`
pub struct FillDepressionsEpsilon {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FillDepressionsEpsilon {
    pub fn new() -> FillDepressionsEpsilon {
        // public constructor
        let name = "FillDepressionsEpsilon".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Fills all of the depressions in a DEM, applying a minimal drainage gradient across the filled surfaces."
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

        FillDepressionsEpsilon {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }

    fn fill<T>(&self, input: &Raster, output_file: &str) -> Result<(Raster, FloodStats), Error>
    where
        T: NextAfter + AsPrimitive<f64>,
        f64: AsPrimitive<T>,
    {
        let mut dem = input.to_cell_array2d::<T>()?;
        let stats = priority_flood_epsilon(&mut dem)?;
        let output = Raster::initialize_using_array2d(output_file, &input.configs, dem);
        Ok((output, stats))
    }
}

impl FloodTool for FillDepressionsEpsilon {
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

        // The gradient is only expressible on floating-point cells. Integer DEMs
        // are run in, and written back as, 64-bit floating point.
        let (mut output, stats) = match input.configs.data_type {
            DataType::F32 => self.fill::<f32>(&input, &output_file)?,
            DataType::F64 => self.fill::<f64>(&input, &output_file)?,
            DataType::U8
            | DataType::U16
            | DataType::I16
            | DataType::U32
            | DataType::I32 => {
                let (mut promoted, stats) = self.fill::<f64>(&input, &output_file)?;
                promoted.configs.data_type = DataType::F64;
                (promoted, stats)
            }
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    "The input raster's data type is unsupported.",
                ));
            }
        };

        if stats.false_pit_cells > 0 {
            eprintln!(
                "Warning: {} cells could not be raised clear of the depression they drain through; \
                the element type is too narrow for this DEM's relief.",
                stats.false_pit_cells
            );
        }
        if verbose {
            println!(
                "{} cells processed. {} cells were in pits.",
                stats.cells_processed, stats.pit_cells
            );
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        output.configs.display_min = input.configs.display_min;
        output.configs.display_max = input.configs.display_max;
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
