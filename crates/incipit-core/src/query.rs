//! The query language: fields, validated queries, and results.
//!
//! Wire queries arrive as string-keyed mappings from field name to values.
//! Keys are translated into the closed [`Field`] enum at this boundary, so
//! an unrecognized field is rejected in exactly one place and matching code
//! can be exhaustive over the field set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Track;

/// Errors raised while validating a query, before any matching work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query contained no fields at all.
    #[error("empty query")]
    EmptyQuery,

    /// The query named a field outside the recognized set.
    #[error("unrecognized query field: {0:?}")]
    UnrecognizedField(String),

    /// A field was supplied with an empty value list.
    #[error("field {field} has no values")]
    NoValues { field: Field },

    /// A field value was the empty string.
    #[error("field {field} has an empty value")]
    EmptyValue { field: Field },

    /// A `track_no` value did not parse as an integer.
    #[error("invalid track number: {value:?}")]
    InvalidTrackNo { value: String },
}

/// The closed set of query fields.
///
/// `AlbumArtist` matches against a track's own artists as well as its
/// album's artists. `Any` matches against every textual projection of a
/// track (name, artist names, album name, album artist names, date, uri).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Track,
    Artist,
    Album,
    AlbumArtist,
    Date,
    TrackNo,
    Uri,
    Any,
}

impl Field {
    /// The wire names recognized by [`Field::parse`], in documentation order.
    pub const NAMES: [&'static str; 8] = [
        "track",
        "artist",
        "album",
        "albumartist",
        "date",
        "track_no",
        "uri",
        "any",
    ];

    /// The wire name of this field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::AlbumArtist => "albumartist",
            Self::Date => "date",
            Self::TrackNo => "track_no",
            Self::Uri => "uri",
            Self::Any => "any",
        }
    }

    /// Translate a wire field name.
    ///
    /// # Errors
    /// Returns [`QueryError::UnrecognizedField`] for names outside the
    /// recognized set.
    pub fn parse(name: &str) -> Result<Self, QueryError> {
        match name {
            "track" => Ok(Self::Track),
            "artist" => Ok(Self::Artist),
            "album" => Ok(Self::Album),
            "albumartist" => Ok(Self::AlbumArtist),
            "date" => Ok(Self::Date),
            "track_no" => Ok(Self::TrackNo),
            "uri" => Ok(Self::Uri),
            "any" => Ok(Self::Any),
            other => Err(QueryError::UnrecognizedField(other.to_string())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One validated query term: a field plus its OR-combined values.
///
/// `TrackNo` values are parsed to integers during validation so matching
/// never re-parses and never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Term {
    Track(Vec<String>),
    Artist(Vec<String>),
    Album(Vec<String>),
    AlbumArtist(Vec<String>),
    Date(Vec<String>),
    TrackNo(Vec<i64>),
    Uri(Vec<String>),
    Any(Vec<String>),
}

/// A validated multi-field query.
///
/// Values within one field are OR-combined; distinct fields are
/// AND-combined. A `Query` can only be constructed through validation, so
/// holding one guarantees the shape invariants: at least one field, no
/// empty value lists, no empty values, integer `track_no` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    terms: Vec<Term>,
}

impl Query {
    /// Start a builder over typed fields.
    #[must_use]
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Build a query from wire-style `(field name, values)` pairs,
    /// preserving pair order.
    ///
    /// # Errors
    /// Returns a [`QueryError`] describing the first shape violation:
    /// an unrecognized field name, an empty query, an empty value list, an
    /// empty value, or a non-integer `track_no` value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = Vec::new();
        for (name, values) in pairs {
            let field = Field::parse(name.as_ref())?;
            fields.push((field, values.into_iter().map(Into::into).collect()));
        }
        Self::from_fields(fields)
    }

    fn from_fields(fields: Vec<(Field, Vec<String>)>) -> Result<Self, QueryError> {
        if fields.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let mut terms = Vec::with_capacity(fields.len());
        for (field, values) in fields {
            if values.is_empty() {
                return Err(QueryError::NoValues { field });
            }
            if values.iter().any(String::is_empty) {
                return Err(QueryError::EmptyValue { field });
            }
            terms.push(Self::term(field, values)?);
        }
        Ok(Self { terms })
    }

    fn term(field: Field, values: Vec<String>) -> Result<Term, QueryError> {
        let term = match field {
            Field::Track => Term::Track(values),
            Field::Artist => Term::Artist(values),
            Field::Album => Term::Album(values),
            Field::AlbumArtist => Term::AlbumArtist(values),
            Field::Date => Term::Date(values),
            Field::Uri => Term::Uri(values),
            Field::Any => Term::Any(values),
            Field::TrackNo => {
                let mut numbers = Vec::with_capacity(values.len());
                for value in values {
                    let number = value
                        .parse::<i64>()
                        .map_err(|_| QueryError::InvalidTrackNo { value: value.clone() })?;
                    numbers.push(number);
                }
                Term::TrackNo(numbers)
            }
        };
        Ok(term)
    }

    pub(crate) fn terms(&self) -> &[Term] {
        &self.terms
    }
}

/// Builder for [`Query`] over typed fields.
///
/// Values are still wire strings (`track_no` included); [`QueryBuilder::build`]
/// runs the same validation as [`Query::from_pairs`].
#[derive(Debug, Default)]
pub struct QueryBuilder {
    fields: Vec<(Field, Vec<String>)>,
}

impl QueryBuilder {
    #[must_use]
    pub fn field<I, V>(mut self, field: Field, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.fields
            .push((field, values.into_iter().map(Into::into).collect()));
        self
    }

    /// Validate and finish the query.
    ///
    /// # Errors
    /// Same shape violations as [`Query::from_pairs`].
    pub fn build(self) -> Result<Query, QueryError> {
        Query::from_fields(self.fields)
    }
}

/// The per-provider result of one `find_exact` or `search` call.
///
/// Always produced, even with zero matches, so an aggregating caller can
/// index into per-provider results positionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Identifier of the provider that produced the result.
    pub provider: String,

    /// Matching tracks in index (catalogue) order.
    pub tracks: Vec<Track>,
}

impl SearchResult {
    #[must_use]
    pub fn new(provider: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            provider: provider.into(),
            tracks,
        }
    }
}
