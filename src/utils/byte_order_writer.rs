/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 14/03/2023
Last Modified: 18/11/2024
License: MIT
*/
use super::byte_order_reader::Endianness;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::io::prelude::*;
use std::io::Error;

/// A writer of binary data that respects a declared byte order.
pub struct ByteOrderWriter<W: Write> {
    is_le: bool,
    writer: W,
}

impl<W: Write> ByteOrderWriter<W> {
    pub fn new(writer: W, byte_order: Endianness) -> ByteOrderWriter<W> {
        let is_le = byte_order == Endianness::LittleEndian;
        ByteOrderWriter {
            writer: writer,
            is_le: is_le,
        }
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), Error> {
        self.writer.write_u8(value)
    }

    pub fn write_i8(&mut self, value: i8) -> Result<(), Error> {
        self.writer.write_i8(value)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), Error> {
        if self.is_le {
            self.writer.write_u16::<LittleEndian>(value)
        } else {
            self.writer.write_u16::<BigEndian>(value)
        }
    }

    pub fn write_i16(&mut self, value: i16) -> Result<(), Error> {
        if self.is_le {
            self.writer.write_i16::<LittleEndian>(value)
        } else {
            self.writer.write_i16::<BigEndian>(value)
        }
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), Error> {
        if self.is_le {
            self.writer.write_u32::<LittleEndian>(value)
        } else {
            self.writer.write_u32::<BigEndian>(value)
        }
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), Error> {
        if self.is_le {
            self.writer.write_i32::<LittleEndian>(value)
        } else {
            self.writer.write_i32::<BigEndian>(value)
        }
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), Error> {
        if self.is_le {
            self.writer.write_f32::<LittleEndian>(value)
        } else {
            self.writer.write_f32::<BigEndian>(value)
        }
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), Error> {
        if self.is_le {
            self.writer.write_f64::<LittleEndian>(value)
        } else {
            self.writer.write_f64::<BigEndian>(value)
        }
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()
    }
}
