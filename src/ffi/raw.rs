use crate::layout::{Field, FieldType, LayoutError, StructLayout};
use std::os::raw::c_void;
use std::sync::Arc;

/// A MUMPS C structure held in a zeroed, 8 byte aligned buffer and
/// accessed through a runtime [`StructLayout`].
///
/// Getters and setters check the field's declared type, so that a value
/// can never be written across a field boundary.
#[derive(Debug)]
pub struct RawStruct {
    layout: Arc<StructLayout>,
    buf: Vec<u64>,
}

const PTR_SIZE: usize = std::mem::size_of::<usize>();

impl RawStruct {
    pub fn new(layout: Arc<StructLayout>) -> Self {
        let words = layout.size().div_ceil(8);
        Self {
            layout,
            buf: vec![0u64; words],
        }
    }

    pub fn layout(&self) -> &StructLayout {
        &self.layout
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.layout.contains(name)
    }

    /// pointer handed to the MUMPS entry point
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        self.buf.as_mut_ptr() as *mut c_void
    }

    fn bytes(&self) -> &[u8] {
        // SAFETY: u64 storage reinterpreted as bytes, same length in bytes
        unsafe { std::slice::from_raw_parts(self.buf.as_ptr() as *const u8, self.buf.len() * 8) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, with unique access through &mut self
        unsafe {
            std::slice::from_raw_parts_mut(self.buf.as_mut_ptr() as *mut u8, self.buf.len() * 8)
        }
    }

    fn typed_field(
        &self,
        name: &str,
        expected: &'static str,
        accept: fn(&FieldType) -> bool,
    ) -> Result<Field, LayoutError> {
        let field = *self.layout.field(name)?;
        if accept(&field.ty) {
            Ok(field)
        } else {
            Err(LayoutError::FieldTypeMismatch {
                field: field.name,
                expected,
            })
        }
    }

    fn element_offset(&self, field: &Field, index: usize) -> Result<usize, LayoutError> {
        let len = field.ty.len();
        if index >= len {
            return Err(LayoutError::IndexOutOfRange {
                field: field.name,
                index,
                len,
            });
        }
        Ok(field.offset + index * field.ty.element_size(self.layout.arithmetic()))
    }

    fn read<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes()[offset..offset + N]);
        out
    }

    fn write(&mut self, offset: usize, src: &[u8]) {
        self.bytes_mut()[offset..offset + src.len()].copy_from_slice(src);
    }

    //----------------------------------------
    // integer fields

    pub fn get_int(&self, name: &str) -> Result<i32, LayoutError> {
        let f = self.typed_field(name, "MUMPS_INT", |t| matches!(t, FieldType::Int))?;
        Ok(i32::from_ne_bytes(self.read(f.offset)))
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), LayoutError> {
        let f = self.typed_field(name, "MUMPS_INT", |t| matches!(t, FieldType::Int))?;
        self.write(f.offset, &value.to_ne_bytes());
        Ok(())
    }

    /// element `index` (0-based) of an integer array field
    pub fn get_int_at(&self, name: &str, index: usize) -> Result<i32, LayoutError> {
        let f = self.typed_field(name, "MUMPS_INT array", |t| {
            matches!(t, FieldType::IntArray(_))
        })?;
        let off = self.element_offset(&f, index)?;
        Ok(i32::from_ne_bytes(self.read(off)))
    }

    pub fn set_int_at(&mut self, name: &str, index: usize, value: i32) -> Result<(), LayoutError> {
        let f = self.typed_field(name, "MUMPS_INT array", |t| {
            matches!(t, FieldType::IntArray(_))
        })?;
        let off = self.element_offset(&f, index)?;
        self.write(off, &value.to_ne_bytes());
        Ok(())
    }

    pub fn get_int8(&self, name: &str) -> Result<i64, LayoutError> {
        let f = self.typed_field(name, "MUMPS_INT8", |t| matches!(t, FieldType::Int8))?;
        Ok(i64::from_ne_bytes(self.read(f.offset)))
    }

    pub fn set_int8(&mut self, name: &str, value: i64) -> Result<(), LayoutError> {
        let f = self.typed_field(name, "MUMPS_INT8", |t| matches!(t, FieldType::Int8))?;
        self.write(f.offset, &value.to_ne_bytes());
        Ok(())
    }

    pub fn get_int8_at(&self, name: &str, index: usize) -> Result<i64, LayoutError> {
        let f = self.typed_field(name, "MUMPS_INT8 array", |t| {
            matches!(t, FieldType::Int8Array(_))
        })?;
        let off = self.element_offset(&f, index)?;
        Ok(i64::from_ne_bytes(self.read(off)))
    }

    //----------------------------------------
    // real fields, stored as float or double per arithmetic

    pub fn get_real_at(&self, name: &str, index: usize) -> Result<f64, LayoutError> {
        let f = self.typed_field(name, "real array", |t| matches!(t, FieldType::RealArray(_)))?;
        let off = self.element_offset(&f, index)?;
        let value = match self.layout.arithmetic().real_size() {
            4 => f32::from_ne_bytes(self.read(off)) as f64,
            _ => f64::from_ne_bytes(self.read(off)),
        };
        Ok(value)
    }

    pub fn set_real_at(&mut self, name: &str, index: usize, value: f64) -> Result<(), LayoutError> {
        let f = self.typed_field(name, "real array", |t| matches!(t, FieldType::RealArray(_)))?;
        let off = self.element_offset(&f, index)?;
        match self.layout.arithmetic().real_size() {
            4 => self.write(off, &(value as f32).to_ne_bytes()),
            _ => self.write(off, &value.to_ne_bytes()),
        }
        Ok(())
    }

    //----------------------------------------
    // pointers

    pub fn get_ptr(&self, name: &str) -> Result<*mut c_void, LayoutError> {
        let f = self.typed_field(name, "pointer", |t| matches!(t, FieldType::Pointer))?;
        let addr = usize::from_ne_bytes(self.read::<PTR_SIZE>(f.offset));
        Ok(addr as *mut c_void)
    }

    /// Store an address in a pointer field.  The caller must keep the
    /// pointee alive and in place for as long as MUMPS may use it.
    pub fn set_ptr<P>(&mut self, name: &str, ptr: *const P) -> Result<(), LayoutError> {
        let f = self.typed_field(name, "pointer", |t| matches!(t, FieldType::Pointer))?;
        self.write(f.offset, &(ptr as usize).to_ne_bytes());
        Ok(())
    }

    pub fn clear_ptr(&mut self, name: &str) -> Result<(), LayoutError> {
        self.set_ptr::<c_void>(name, std::ptr::null())
    }

    //----------------------------------------
    // character and raw byte fields

    /// contents of a character field up to the first NUL
    pub fn get_chars(&self, name: &str) -> Result<String, LayoutError> {
        let raw = self.field_bytes(name)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Write a NUL terminated string into a character field.
    pub fn set_chars(&mut self, name: &str, value: &str) -> Result<(), LayoutError> {
        let f = self.typed_field(name, "char array", |t| matches!(t, FieldType::Chars(_)))?;
        let max = f.ty.len() - 1;
        if value.len() > max {
            return Err(LayoutError::StringTooLong {
                field: f.name,
                len: value.len(),
                max,
            });
        }
        let mut data = vec![0u8; f.ty.len()];
        data[..value.len()].copy_from_slice(value.as_bytes());
        self.write(f.offset, &data);
        Ok(())
    }

    /// raw bytes of a character or byte field
    pub fn field_bytes(&self, name: &str) -> Result<&[u8], LayoutError> {
        let f = self.typed_field(name, "char or byte array", |t| {
            matches!(t, FieldType::Chars(_) | FieldType::Bytes(_))
        })?;
        Ok(&self.bytes()[f.offset..f.offset + f.ty.len()])
    }
}
