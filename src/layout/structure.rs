use super::{fields_for_version, probe_fields, FieldDef, FieldType, LayoutError, MumpsVersion};
use crate::algebra::Arithmetic;
use std::collections::HashMap;

/// A field of the MUMPS structure placed at its C offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    /// byte offset from the start of the structure
    pub offset: usize,
}

/// Memory layout of a MUMPS C structure, computed with the platform's
/// natural alignment rules: each field is placed at the next multiple of
/// its alignment and the total size is padded to the largest alignment.
#[derive(Debug, Clone)]
pub struct StructLayout {
    fields: Vec<Field>,
    index: HashMap<&'static str, usize>,
    size: usize,
    align: usize,
    arithmetic: Arithmetic,
    version: Option<MumpsVersion>,
}

fn round_up(x: usize, align: usize) -> usize {
    x.div_ceil(align) * align
}

impl StructLayout {
    pub fn new(defs: &[FieldDef], arithmetic: Arithmetic) -> Self {
        let mut fields = Vec::with_capacity(defs.len());
        let mut index = HashMap::with_capacity(defs.len());
        let mut offset = 0;
        let mut align = 1;

        for &(name, ty) in defs {
            let a = ty.align(arithmetic);
            offset = round_up(offset, a);
            index.insert(name, fields.len());
            fields.push(Field { name, ty, offset });
            offset += ty.size(arithmetic);
            align = align.max(a);
        }

        Self {
            fields,
            index,
            size: round_up(offset, align),
            align,
            arithmetic,
            version: None,
        }
    }

    /// Layout of the MUMPS structure of a specific library release.
    pub fn for_version(version: MumpsVersion, arithmetic: Arithmetic) -> Result<Self, LayoutError> {
        let defs = fields_for_version(version)?;
        let mut layout = Self::new(&defs, arithmetic);
        layout.version = Some(version);
        Ok(layout)
    }

    /// Layout used to query the library version before the real layout is known.
    pub fn probe(arithmetic: Arithmetic) -> Self {
        Self::new(&probe_fields(), arithmetic)
    }

    pub fn field(&self, name: &str) -> Result<&Field, LayoutError> {
        self.index
            .get(name)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| LayoutError::UnknownField(name.to_string()))
    }

    pub fn offset_of(&self, name: &str) -> Result<usize, LayoutError> {
        Ok(self.field(name)?.offset)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// total size in bytes, including trailing padding
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn align(&self) -> usize {
        self.align
    }

    pub fn arithmetic(&self) -> Arithmetic {
        self.arithmetic
    }

    /// library release this layout describes (None for the probe layout)
    pub fn version(&self) -> Option<MumpsVersion> {
        self.version
    }
}
