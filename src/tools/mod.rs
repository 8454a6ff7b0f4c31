/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 14/03/2023
Last Modified: 02/05/2025
License: MIT
*/

pub mod hydro_analysis;

use crate::utils::get_formatted_elapsed_time;
use serde_json;
use std::io::{Error, ErrorKind};
use std::time::Instant;

#[derive(Default)]
pub struct ToolManager {
    pub working_dir: String,
    pub verbose: bool,
    tool_names: Vec<String>,
}

impl ToolManager {
    pub fn new<'a>(working_directory: &'a str, verbose_mode: &'a bool) -> Result<ToolManager, Error> {
        let mut tool_names = vec![];
        // hydro_analysis
        tool_names.push("FillDepressions".to_string());
        tool_names.push("FillDepressionsEpsilon".to_string());
        tool_names.push("FillDepressionsOriginal".to_string());
        tool_names.push("FillDepressionsZhou".to_string());
        tool_names.push("FloodFlowDirections".to_string());
        tool_names.push("PitMask".to_string());
        tool_names.push("Watersheds".to_string());

        let tm = ToolManager {
            working_dir: working_directory.to_string(),
            verbose: *verbose_mode,
            tool_names: tool_names,
        };
        Ok(tm)
    }

    fn get_tool(&self, tool_name: &str) -> Option<Box<dyn FloodTool>> {
        match tool_name.to_lowercase().as_str() {
            "filldepressions" => Some(Box::new(hydro_analysis::FillDepressions::new())),
            "filldepressionsepsilon" => {
                Some(Box::new(hydro_analysis::FillDepressionsEpsilon::new()))
            }
            "filldepressionsoriginal" => {
                Some(Box::new(hydro_analysis::FillDepressionsOriginal::new()))
            }
            "filldepressionszhou" => Some(Box::new(hydro_analysis::FillDepressionsZhou::new())),
            "floodflowdirections" => Some(Box::new(hydro_analysis::FloodFlowDirections::new())),
            "pitmask" => Some(Box::new(hydro_analysis::PitMask::new())),
            "watersheds" => Some(Box::new(hydro_analysis::Watersheds::new())),
            _ => None,
        }
    }

    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.get_tool(tool_name).is_some()
    }

    pub fn run_tool(&self, tool_name: String, args: Vec<String>) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => tool.run(args, &self.working_dir, self.verbose),
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("Unrecognized tool name {}.", tool_name),
            )),
        }
    }

    pub fn tool_help(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => {
                println!("{}", get_help(tool));
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("Unrecognized tool name {}.", tool_name),
            )),
        }
    }

    pub fn list_tools(&self) {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for name in &self.tool_names {
            let tool = self
                .get_tool(name)
                .expect("Error retrieving tool from ToolManager.");
            tool_details.push((tool.get_tool_name(), tool.get_tool_description()));
        }
        let mut ret = format!("All {} Available Tools:\n", tool_details.len());
        for tool in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", tool.0, tool.1));
        }
        println!("{}", ret);
    }
}

pub trait FloodTool {
    fn get_tool_name(&self) -> String;
    fn get_tool_description(&self) -> String;
    fn get_tool_parameters(&self) -> String;
    fn get_example_usage(&self) -> String;
    fn get_toolbox(&self) -> String;
    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error>;
}

fn get_help<'a>(wt: Box<dyn FloodTool + 'a>) -> String {
    let tool_name = wt.get_tool_name();
    let description = wt.get_tool_description();
    let parameters = wt.get_tool_parameters();
    let toolbox = wt.get_toolbox();
    let o: serde_json::Value = serde_json::from_str(&parameters).unwrap();
    let a = o["parameters"].as_array().unwrap();
    let mut p = String::new();
    p.push_str("Flag               Description\n");
    p.push_str("-----------------  -----------\n");
    for d in a {
        let mut s = String::new();
        for f in d["flags"].as_array().unwrap() {
            s.push_str(&format!("{}, ", f.as_str().unwrap()));
        }
        p.push_str(&format!(
            "{:width$} {}\n",
            s.trim_end_matches(", "),
            d["description"].as_str().unwrap_or(""),
            width = 18
        ));
    }
    let example = wt.get_example_usage();
    format!(
        "{}
Description:\n{}
Toolbox: {}
Parameters:\n
{}

Example usage:
{}
",
        tool_name, description, toolbox, p, example
    )
}

#[derive(Serialize, Deserialize, Debug)]
struct ToolParameter {
    name: String,
    flags: Vec<String>,
    description: String,
    parameter_type: ParameterType,
    default_value: Option<String>,
    optional: bool,
}

#[derive(Serialize, Deserialize, Debug)]
enum ParameterType {
    ExistingFile(ParameterFileType),
    NewFile(ParameterFileType),
}

#[derive(Serialize, Deserialize, Debug)]
enum ParameterFileType {
    Raster,
}
