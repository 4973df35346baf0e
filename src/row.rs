use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::slice;
use std::sync::Arc;

use crate::error::{Error, Key, Result};
use crate::fieldnames::FieldNames;

/// An owned CSV row: an ordered sequence of string fields, optionally bound
/// to the [`FieldNames`] of the reader that produced it.
///
/// Field names are never owned by the row: a [`DictReader`](crate::DictReader)
/// attaches the same shared table to every row it yields.
///
/// Two rows are equal when their fields are equal, whatever field names they
/// are bound to.
#[derive(Default, Clone)]
pub struct Row {
    records: Vec<String>,
    fieldnames: Option<Arc<FieldNames>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            fieldnames: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.records.clear();
    }

    #[inline]
    pub fn iter(&self) -> FieldIter<'_> {
        FieldIter {
            inner: self.records.iter(),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[String] {
        &self.records
    }

    /// Return the last field, if any.
    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.records.last().map(String::as_str)
    }

    /// Consume the row and return its fields.
    #[inline]
    pub fn into_inner(self) -> Vec<String> {
        self.records
    }

    /// Push an already owned field.
    #[inline(always)]
    pub fn push_field(&mut self, field: String) {
        self.records.push(field);
    }

    /// Push any value having a textual representation, e.g. when building a
    /// row to be written.
    ///
    /// ```
    /// let mut row = miocsv::Row::new();
    /// row.append("john");
    /// row.append(45);
    /// row.append(1.5);
    /// assert_eq!(row.to_string(), "john,45,1.5");
    /// ```
    #[inline]
    pub fn append<T: fmt::Display>(&mut self, value: T) {
        self.records.push(value.to_string());
    }

    /// Return the field at `index`, or a `NoRecord` error.
    #[inline]
    pub fn get(&self, index: usize) -> Result<&str> {
        self.records
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::no_record(Key::Index(index), self.len()))
    }

    /// Return a mutable reference to the field at `index`, or a `NoRecord`
    /// error.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Result<&mut String> {
        let len = self.len();

        self.records
            .get_mut(index)
            .ok_or_else(|| Error::no_record(Key::Index(index), len))
    }

    /// Return the field named `name`, or a `NoRecord` error.
    ///
    /// This fails when the row has no field names attached, when the name is
    /// unknown, or when its column lies past the row's last field. Fields
    /// beyond the last field name can only be reached by index.
    pub fn by_name(&self, name: &str) -> Result<&str> {
        self.fieldnames
            .as_ref()
            .and_then(|fieldnames| fieldnames.get(name))
            .and_then(|i| self.records.get(i))
            .map(String::as_str)
            .ok_or_else(|| Error::no_record(Key::Name(name.to_string()), self.len()))
    }

    /// Return the field names bound to this row, if any.
    #[inline]
    pub fn fieldnames(&self) -> Option<&FieldNames> {
        self.fieldnames.as_deref()
    }

    #[inline]
    pub(crate) fn attach_fieldnames(&mut self, fieldnames: Arc<FieldNames>) {
        self.fieldnames = Some(fieldnames);
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for Row {}

impl Hash for Row {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.records.hash(state);
    }
}

impl Index<usize> for Row {
    type Output = str;

    /// # Panics
    ///
    /// Panics with the `NoRecord` error message if `index` is out of bounds.
    /// Use [`Row::get`] to handle this case.
    #[inline]
    fn index(&self, index: usize) -> &str {
        match self.get(index) {
            Ok(field) => field,
            Err(err) => panic!("{}", err),
        }
    }
}

impl Index<&str> for Row {
    type Output = str;

    /// # Panics
    ///
    /// Panics with the `NoRecord` error message if the name cannot be
    /// resolved. Use [`Row::by_name`] to handle this case.
    #[inline]
    fn index(&self, name: &str) -> &str {
        match self.by_name(name) {
            Ok(field) => field,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<T: Into<String>> Extend<T> for Row {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.records.extend(iter.into_iter().map(Into::into));
    }
}

impl<T: Into<String>> FromIterator<T> for Row {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut row = Self::new();
        row.extend(iter);
        row
    }
}

impl From<Vec<String>> for Row {
    fn from(records: Vec<String>) -> Self {
        Self {
            records,
            fieldnames: None,
        }
    }
}

impl<'r> IntoIterator for &'r Row {
    type IntoIter = FieldIter<'r>;
    type Item = &'r str;

    #[inline]
    fn into_iter(self) -> FieldIter<'r> {
        self.iter()
    }
}

impl IntoIterator for Row {
    type IntoIter = std::vec::IntoIter<String>;
    type Item = String;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Fields joined by commas, without any quoting. Use a
/// [`Writer`](crate::Writer) to produce valid CSV.
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let last_i = self.len().saturating_sub(1);

        for (i, field) in self.iter().enumerate() {
            f.write_str(field)?;

            if i != last_i {
                f.write_str(",")?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Row(")?;
        f.debug_list().entries(self.iter()).finish()?;
        write!(f, ")")
    }
}

pub struct FieldIter<'a> {
    inner: slice::Iter<'a, String>,
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(String::as_str)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for FieldIter<'_> {}

impl DoubleEndedIterator for FieldIter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(String::as_str)
    }
}
