//! Single-object, list and paginated-collection decoding.

use super::casing::{normalize_object, KeyCasing};
use super::mapper::ObjectMapper;
use crate::{Error, ErrorContext, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const RESULTS_KEY: &str = "results";
const CURRENT_PAGE_KEY: &str = "currentPage";
const MAX_PAGES_KEY: &str = "maxPages";

/// One page of a paginated collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub max_pages: u64,
}

impl<T> PaginatedResult<T> {
    pub fn results(&self) -> &[T] {
        &self.items
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.max_pages
    }
}

impl<T> IntoIterator for PaginatedResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Result of decoding a collection response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection<T> {
    List(Vec<T>),
    Paginated(PaginatedResult<T>),
}

impl<T> Collection<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Collection::List(items) => items,
            Collection::Paginated(page) => &page.items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Collection::List(items) => items,
            Collection::Paginated(page) => page.items,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn as_paginated(&self) -> Option<&PaginatedResult<T>> {
        match self {
            Collection::Paginated(page) => Some(page),
            Collection::List(_) => None,
        }
    }
}

/// Drives an [`ObjectMapper`] over an envelope-unwrapped tree.
pub struct ResultAssembler<'a, M> {
    mapper: &'a M,
    casing: KeyCasing,
}

impl<'a, M: ObjectMapper> ResultAssembler<'a, M> {
    pub fn new(mapper: &'a M, casing: KeyCasing) -> Self {
        Self { mapper, casing }
    }

    pub fn decode_one<T: DeserializeOwned>(&self, payload: Value) -> Result<T> {
        self.mapper.deserialize(self.casing.apply(payload))
    }

    /// A `results` key selects the paginated shape, even when the sequence is
    /// empty. Arrays are mapped per element; other objects are mapped over
    /// their values in order.
    pub fn decode_many<T: DeserializeOwned>(&self, payload: Value) -> Result<Collection<T>> {
        match payload {
            Value::Object(map) if map.contains_key(RESULTS_KEY) => {
                self.decode_page(map).map(Collection::Paginated)
            }
            Value::Object(map) => self.decode_items(map.into_iter().map(|(_, v)| v)).map(Collection::List),
            Value::Array(items) => self.decode_items(items).map(Collection::List),
            other => Err(Error::structural_with_context(
                "collection response must be an object or an array",
                ErrorContext::new()
                    .with_details(other.to_string())
                    .with_source("result_assembler"),
            )),
        }
    }

    fn decode_page<T: DeserializeOwned>(&self, map: Map<String, Value>) -> Result<PaginatedResult<T>> {
        let mut page = normalize_object(map);

        let items = match page.remove(RESULTS_KEY) {
            Some(Value::Array(items)) => items,
            other => {
                return Err(Error::structural_with_context(
                    "paginated response `results` must be an array",
                    ErrorContext::new()
                        .with_field_path(RESULTS_KEY)
                        .with_details(other.map(|v| v.to_string()).unwrap_or_default())
                        .with_source("result_assembler"),
                ))
            }
        };

        let current_page = page_field(&page, CURRENT_PAGE_KEY)?;
        let max_pages = page_field(&page, MAX_PAGES_KEY)?;

        Ok(PaginatedResult {
            items: self.decode_items(items)?,
            current_page,
            max_pages,
        })
    }

    fn decode_items<T: DeserializeOwned>(&self, items: impl IntoIterator<Item = Value>) -> Result<Vec<T>> {
        items
            .into_iter()
            .map(|item| self.mapper.deserialize(self.casing.apply(item)))
            .collect()
    }
}

fn page_field(page: &Map<String, Value>, field: &str) -> Result<u64> {
    match page.get(field) {
        Some(value) => value.as_u64().ok_or_else(|| {
            Error::structural_with_context(
                "pagination field must be a non-negative integer",
                ErrorContext::new()
                    .with_field_path(field)
                    .with_details(value.to_string())
                    .with_source("result_assembler"),
            )
        }),
        None => Err(Error::structural_with_context(
            "paginated response is missing a pagination field",
            ErrorContext::new()
                .with_field_path(field)
                .with_source("result_assembler"),
        )),
    }
}
