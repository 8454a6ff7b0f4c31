/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 14/03/2023
Last Modified: 02/05/2025
License: MIT
*/

use flood_tools::tools::ToolManager;
use std::env;
use std::io::Error;
use std::process;

fn main() {
    match run() {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(-1);
        }
    }
}

fn run() -> Result<(), Error> {
    let args: Vec<String> = env::args().collect();

    let mut verbose = false;
    let mut list_tools = false;
    let mut tool_help = String::new();
    let mut positional: Vec<String> = vec![];
    for arg in args.iter().skip(1) {
        if arg == "-v" || arg == "--verbose" {
            verbose = true;
        } else if arg == "--listtools" {
            list_tools = true;
        } else if arg.starts_with("--toolhelp") {
            let cmd = arg.split("=");
            let vec = cmd.collect::<Vec<&str>>();
            if vec.len() > 1 {
                tool_help = vec[1].to_string();
            }
        } else {
            positional.push(arg.clone());
        }
    }

    let working_dir = String::new();
    let tm = ToolManager::new(&working_dir, &verbose)?;

    if list_tools {
        tm.list_tools();
        return Ok(());
    }
    if !tool_help.is_empty() {
        return tm.tool_help(tool_help);
    }

    if positional.len() != 3 {
        usage(&args[0]);
        process::exit(-1);
    }

    let tool_name = match positional[0].as_ref() {
        "1" => "FillDepressionsOriginal".to_string(),
        "2" => "FillDepressions".to_string(),
        "3" => "FillDepressionsEpsilon".to_string(),
        "4" => "FloodFlowDirections".to_string(),
        "5" => "Watersheds".to_string(),
        "6" => "FillDepressionsZhou".to_string(),
        name => {
            if tm.has_tool(name) {
                name.to_string()
            } else {
                eprintln!("Unrecognised algorithm choice!");
                process::exit(-1);
            }
        }
    };

    let tool_args = vec![
        format!("-i={}", positional[1]),
        format!("-o={}", positional[2]),
    ];
    tm.run_tool(tool_name, tool_args)
}

fn usage(exe: &str) {
    println!("{} <ALGORITHM> <INPUT DEM> <OUTPUT>", exe);
    println!("Algorithms:");
    println!("\t1: Original Priority-Flood");
    println!("\t2: Improved Priority-Flood");
    println!("\t3: Priority-Flood+Epsilon");
    println!("\t4: Priority-Flood+FlowDirs");
    println!("\t5: Priority-Flood+Watershed Labels");
    println!("\t6: Zhou 2016 Priority-Flood");
    println!("A tool name (see --listtools) may be given in place of the algorithm number.");
}
