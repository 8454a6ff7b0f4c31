/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 14/03/2023
Last Modified: 18/11/2024
License: MIT
*/
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::prelude::*;
use std::io::Result;

/// A reader of binary data that respects a declared byte order.
pub struct ByteOrderReader<R: Read> {
    is_le: bool,
    reader: R,
}

impl<R: Read> ByteOrderReader<R> {
    pub fn new(reader: R, byte_order: Endianness) -> ByteOrderReader<R> {
        let is_le = byte_order == Endianness::LittleEndian;
        ByteOrderReader {
            reader: reader,
            is_le: is_le,
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.reader.read_u8()
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.reader.read_i8()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        if self.is_le {
            return self.reader.read_u16::<LittleEndian>();
        }
        self.reader.read_u16::<BigEndian>()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        if self.is_le {
            return self.reader.read_i16::<LittleEndian>();
        }
        self.reader.read_i16::<BigEndian>()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        if self.is_le {
            return self.reader.read_u32::<LittleEndian>();
        }
        self.reader.read_u32::<BigEndian>()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        if self.is_le {
            return self.reader.read_i32::<LittleEndian>();
        }
        self.reader.read_i32::<BigEndian>()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        if self.is_le {
            return self.reader.read_f32::<LittleEndian>();
        }
        self.reader.read_f32::<BigEndian>()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        if self.is_le {
            return self.reader.read_f64::<LittleEndian>();
        }
        self.reader.read_f64::<BigEndian>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endianness {
    LittleEndian,
    BigEndian,
}

impl Endianness {
    pub fn from_str<'a>(val: &'a str) -> Endianness {
        // recognized spellings from the header formats this library reads
        let val_lc: &str = &val.to_lowercase();
        if val_lc.contains("lsb")
            || val_lc.contains("little")
            || val_lc.contains("intel")
            || val_lc.contains("least")
        {
            return Endianness::LittleEndian;
        }
        Endianness::BigEndian
    }
}
