//! Declarative fixed-width record layouts.
//!
//! A [`FixedWidthLayout`] is an ordered list of fields, each with a width and
//! a decoder. Decoding cuts the line into consecutive substrings, trims each
//! one and hands it to the field's decoder. Lines longer than the layout are
//! accepted and the trailing characters ignored.

use crate::error::RecordError;

/// How a field's trimmed text is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Identity, blank allowed.
    Text,
    /// Blank decodes to `None`.
    OptionalText,
    /// Signed integer.
    Integer,
    /// Integer written back zero-padded, e.g. months as `01`.
    PaddedInteger,
    /// Signed decimal, written back with `places` digits after the point.
    Decimal { places: usize },
    /// Blank decodes to `None`, any other single character to itself.
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, width: usize, kind: FieldKind) -> Self {
        FieldSpec { name, width, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    OptionalText(Option<String>),
    Integer(i32),
    Decimal(f64),
    Flag(Option<char>),
}

/// The decoded fields of one line, in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(&'static str, FieldValue)>,
}

impl Record {
    pub fn get(&self, name: &'static str) -> Result<&FieldValue, RecordError> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
            .ok_or(RecordError::UnknownField { field: name })
    }

    pub fn text(&self, name: &'static str) -> Result<&str, RecordError> {
        match self.get(name)? {
            FieldValue::Text(s) => Ok(s),
            other => Err(mismatch(name, other, "text")),
        }
    }

    pub fn optional_text(&self, name: &'static str) -> Result<Option<&str>, RecordError> {
        match self.get(name)? {
            FieldValue::OptionalText(s) => Ok(s.as_deref()),
            other => Err(mismatch(name, other, "optional text")),
        }
    }

    pub fn integer(&self, name: &'static str) -> Result<i32, RecordError> {
        match self.get(name)? {
            FieldValue::Integer(v) => Ok(*v),
            other => Err(mismatch(name, other, "integer")),
        }
    }

    pub fn decimal(&self, name: &'static str) -> Result<f64, RecordError> {
        match self.get(name)? {
            FieldValue::Decimal(v) => Ok(*v),
            other => Err(mismatch(name, other, "decimal")),
        }
    }

    pub fn flag(&self, name: &'static str) -> Result<Option<char>, RecordError> {
        match self.get(name)? {
            FieldValue::Flag(f) => Ok(*f),
            other => Err(mismatch(name, other, "flag")),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, value)| value)
    }
}

fn mismatch(name: &'static str, value: &FieldValue, wanted: &str) -> RecordError {
    RecordError::invalid(name, &format!("{:?}", value), format!("expected {}", wanted))
}

#[derive(Debug, Clone, Copy)]
pub struct FixedWidthLayout {
    fields: &'static [FieldSpec],
    width: usize,
}

impl FixedWidthLayout {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        let mut width = 0;
        let mut i = 0;
        while i < fields.len() {
            width += fields[i].width;
            i += 1;
        }

        FixedWidthLayout { fields, width }
    }

    /// Sum of the declared field widths.
    pub const fn width(&self) -> usize {
        self.width
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn decode(&self, line: &str) -> Result<Record, RecordError> {
        if line.len() < self.width {
            return Err(RecordError::TruncatedRecord {
                required: self.width,
                actual: line.len(),
            });
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        let mut offset = 0;
        for spec in self.fields {
            let raw = line
                .get(offset..offset + spec.width)
                .ok_or_else(|| RecordError::invalid(spec.name, line, "non-ASCII text in line"))?;
            fields.push((spec.name, decode_field(spec, raw.trim())?));
            offset += spec.width;
        }

        Ok(Record { fields })
    }

    /// Inverse of [`decode`](Self::decode). Text is left-justified, numbers
    /// right-justified and absent flags written as a blank.
    pub fn encode<'a, I>(&self, values: I) -> Result<String, RecordError>
    where
        I: IntoIterator<Item = &'a FieldValue>,
    {
        let mut line = String::with_capacity(self.width);
        let mut values = values.into_iter();

        for spec in self.fields {
            let value = values
                .next()
                .ok_or_else(|| RecordError::invalid(spec.name, "", "no value supplied"))?;
            let cell = encode_field(spec, value)?;
            if cell.len() != spec.width {
                return Err(RecordError::invalid(
                    spec.name,
                    &cell,
                    format!("does not fit in {} characters", spec.width),
                ));
            }
            line.push_str(&cell);
        }

        Ok(line)
    }
}

fn decode_field(spec: &FieldSpec, raw: &str) -> Result<FieldValue, RecordError> {
    let value = match spec.kind {
        FieldKind::Text => FieldValue::Text(raw.to_string()),
        FieldKind::OptionalText => {
            FieldValue::OptionalText(Some(raw).filter(|s| !s.is_empty()).map(str::to_string))
        }
        FieldKind::Integer | FieldKind::PaddedInteger => FieldValue::Integer(
            raw.parse::<i32>()
                .map_err(|e| RecordError::invalid(spec.name, raw, e))?,
        ),
        FieldKind::Decimal { .. } => {
            let value = raw
                .parse::<f64>()
                .map_err(|e| RecordError::invalid(spec.name, raw, e))?;
            if !value.is_finite() {
                return Err(RecordError::invalid(spec.name, raw, "not a finite number"));
            }
            FieldValue::Decimal(value)
        }
        FieldKind::Flag => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (None, _) => FieldValue::Flag(None),
                (Some(c), None) => FieldValue::Flag(Some(c)),
                _ => return Err(RecordError::invalid(spec.name, raw, "flag wider than one character")),
            }
        }
    };

    Ok(value)
}

fn encode_field(spec: &FieldSpec, value: &FieldValue) -> Result<String, RecordError> {
    let width = spec.width;
    let cell = match (spec.kind, value) {
        (FieldKind::Text, FieldValue::Text(s)) => format!("{:<width$}", s),
        (FieldKind::OptionalText, FieldValue::OptionalText(s)) => {
            format!("{:<width$}", s.as_deref().unwrap_or(""))
        }
        (FieldKind::Integer, FieldValue::Integer(v)) => format!("{:>width$}", v),
        (FieldKind::PaddedInteger, FieldValue::Integer(v)) => format!("{:0width$}", v),
        (FieldKind::Decimal { places }, FieldValue::Decimal(v)) => {
            format!("{:>width$.places$}", v)
        }
        (FieldKind::Flag, FieldValue::Flag(f)) => format!("{:<width$}", f.unwrap_or(' ')),
        (_, other) => return Err(mismatch(spec.name, other, "value matching the layout")),
    };

    Ok(cell)
}

// -- Tests ----------------------------------------------------------------------------
