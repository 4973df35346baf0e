use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use crate::row::Row;

/// A mapping from field names to zero-based column indices.
///
/// The table is ordered by name, not by column, so anything displaying or
/// serializing the header goes through [`FieldNames::ordered`] to get the
/// original column order back.
///
/// A [`DictReader`](crate::DictReader) builds exactly one table and shares it,
/// read-only, with every row it yields.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct FieldNames {
    map: BTreeMap<String, usize>,
}

impl FieldNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from header names given in column order.
    ///
    /// When a name appears more than once, its last column wins.
    pub fn from_names<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut fieldnames = Self::new();

        for (i, name) in names.into_iter().enumerate() {
            fieldnames.map.insert(name.into(), i);
        }

        fieldnames
    }

    /// Build the table from a header row.
    pub fn from_row(row: &Row) -> Self {
        Self::from_names(row.iter())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Return the column index of the given name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.map.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Iterate over `(name, index)` pairs, sorted by name.
    pub fn iter(&self) -> FieldNamesIter<'_> {
        FieldNamesIter {
            inner: self.map.iter(),
        }
    }

    /// Return the names sorted by column index, i.e. in header order.
    pub fn ordered(&self) -> Vec<&str> {
        let mut pairs: Vec<(&str, usize)> = self.iter().collect();
        pairs.sort_by_key(|(_, i)| *i);
        pairs.into_iter().map(|(name, _)| name).collect()
    }

    /// Convert the table back into a header row, in column order.
    pub fn to_row(&self) -> Row {
        self.ordered().into_iter().collect()
    }
}

impl fmt::Display for FieldNames {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ordered = self.ordered();
        let last_i = ordered.len().saturating_sub(1);

        for (i, name) in ordered.iter().enumerate() {
            f.write_str(name)?;

            if i != last_i {
                f.write_str(",")?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for FieldNames {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FieldNames(")?;
        f.debug_map().entries(self.iter()).finish()?;
        write!(f, ")")
    }
}

pub struct FieldNamesIter<'a> {
    inner: btree_map::Iter<'a, String, usize>,
}

impl<'a> Iterator for FieldNamesIter<'a> {
    type Item = (&'a str, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(name, i)| (name.as_str(), *i))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for FieldNamesIter<'_> {}

impl<'a> IntoIterator for &'a FieldNames {
    type IntoIter = FieldNamesIter<'a>;
    type Item = (&'a str, usize);

    fn into_iter(self) -> FieldNamesIter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fieldnames() {
        let fieldnames = FieldNames::from_names(["name", "id", "age"]);

        assert_eq!(fieldnames.len(), 3);
        assert_eq!(fieldnames.get("name"), Some(0));
        assert_eq!(fieldnames.get("id"), Some(1));
        assert_eq!(fieldnames.get("age"), Some(2));
        assert_eq!(fieldnames.get("surname"), None);

        // Native order is by name
        assert_eq!(
            fieldnames.iter().collect::<Vec<_>>(),
            vec![("age", 2), ("id", 1), ("name", 0)]
        );
    }

    #[test]
    fn test_display_restores_column_order() {
        let fieldnames = FieldNames::from_names(["name", "link_id", "from_node_id", "capacity"]);

        assert_eq!(
            fieldnames.ordered(),
            vec!["name", "link_id", "from_node_id", "capacity"]
        );
        assert_eq!(fieldnames.to_string(), "name,link_id,from_node_id,capacity");
        assert_eq!(FieldNames::new().to_string(), "");
    }

    #[test]
    fn test_duplicate_names() {
        let fieldnames = FieldNames::from_names(["a", "b", "a"]);

        assert_eq!(fieldnames.len(), 2);
        assert_eq!(fieldnames.get("a"), Some(2));
        assert_eq!(fieldnames.ordered(), vec!["b", "a"]);
    }

    #[test]
    fn test_from_row() {
        let fieldnames = FieldNames::from_row(&crate::row!["name", "id"]);

        assert_eq!(fieldnames.get("name"), Some(0));
        assert_eq!(fieldnames.get("id"), Some(1));
        assert_eq!(fieldnames.to_row(), crate::row!["name", "id"]);
    }
}
