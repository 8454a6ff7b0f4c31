/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 14/03/2023
Last Modified: 02/05/2025
License: MIT
*/

/*!
FloodTools is a library and command-line program for hydrological pre-processing
of raster digital elevation models. It removes depressions and digital dams from
DEMs and derives D8 flow pointers, pit masks, and watershed labellings, using the
Priority-Flood family of algorithms.

The library is organized in layers: `structures` holds the in-memory grid and the
flood frontier, `algorithms` the flood variants themselves (which never touch the
file system), `raster` the supported raster formats, and `tools` the command-line
tools that tie the two together.
*/

#[macro_use]
extern crate serde_derive;

pub mod algorithms;
pub mod raster;
pub mod structures;
pub mod tools;
pub mod utils;
