/*
This tool is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 14/03/2023
Last Modified: 02/05/2025
License: MIT
*/

use crate::algorithms::{improved_priority_flood, CellValue, FloodStats};
use crate::raster::*;
use crate::tools::*;
use num_traits::AsPrimitive;
use std::env;
use std::io::{Error, ErrorKind};
use std::path;

/// This tool can be used to fill all of the depressions in a digital elevation model (DEM) so that every
/// grid cell possesses a continuous, non-ascending flow path to an outlet located along the grid edge.
/// This is a common pre-processing step required by many flow-path analysis applications. The tool uses
/// the efficient depression filling method of Barnes, Lehman and Mulla (2014): grid cells are examined
/// by their spill elevation, starting from the edge cells, and visited from lowest order using a priority
/// queue; runs of cells at or below the elevation of an already-drained neighbour bypass the priority
/// queue entirely through a plain first-in, first-out queue.
///
/// Grid cells possessing the NoData value in the input DEM keep the NoData value in the output and are
/// never raised. Interior regions of NoData are treated as drainage outlets: terrain that descends into
/// them is left intact rather than being flooded up to the elevation of the surrounding rim.
///
/// # Reference
/// Barnes, R., Lehman, C., and Mulla, D. 2014. Priority-flood: An optimal depression-filling and
/// watershed-labeling algorithm for digital elevation models. Computers & Geosciences, 62: 117-127.
///
/// # See Also
/// `FillDepressionsZhou`, `FillDepressionsEpsilon`, `FillDepressionsOriginal`, `PitMask`
pub struct FillDepressions {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FillDepressions {
    pub fn new() -> FillDepressions {
        // public constructor
        let name = "FillDepressions".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Fills all of the depressions in a DEM so that every cell drains to the grid edge."
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

        FillDepressions {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }

    fn fill<T>(&self, input: &Raster, output_file: &str) -> Result<(Raster, FloodStats), Error>
    where
        T: CellValue + AsPrimitive<f64>,
        f64: AsPrimitive<T>,
    {
        let mut dem = input.to_cell_array2d::<T>()?;
        let stats = improved_priority_flood(&mut dem)?;
        let output = Raster::initialize_using_array2d(output_file, &input.configs, dem);
        Ok((output, stats))
    }
}

impl FloodTool for FillDepressions {
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

        let (mut output, stats) = match input.configs.data_type {
            DataType::U8 => self.fill::<u8>(&input, &output_file)?,
            DataType::U16 => self.fill::<u16>(&input, &output_file)?,
            DataType::I16 => self.fill::<i16>(&input, &output_file)?,
            DataType::U32 => self.fill::<u32>(&input, &output_file)?,
            DataType::I32 => self.fill::<i32>(&input, &output_file)?,
            DataType::F32 => self.fill::<f32>(&input, &output_file)?,
            DataType::F64 => self.fill::<f64>(&input, &output_file)?,
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    "The input raster's data type is unsupported.",
                ));
            }
        };

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
