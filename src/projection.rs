//! Projection engine contract: conversion from the source (store) shape to
//! the destination (presentation) shape.
//!
//! A projector can convert in two places:
//! - in memory, one materialized record at a time ([`Projector::map`])
//! - inside the store query itself ([`Projector::project`]), so the store
//!   returns already converted data
//!
//! Stores without a way to translate a projection fall back to the default
//! `project`, which fetches and maps. Element order is always preserved.

use crate::error::SearchError;
use crate::repository::{BoxFuture, Queryable};
use std::marker::PhantomData;

pub trait Projector<S, D, Q: Queryable<S>> {
    /// Convert one materialized record.
    fn map(&self, source: S) -> D;

    /// Run `query` with the conversion expressed store-side.
    fn project(&self, query: Q) -> Result<Vec<D>, SearchError> {
        Ok(query.fetch()?.into_iter().map(|source| self.map(source)).collect())
    }

    /// Non-blocking form of [`project`](Self::project).
    fn project_async<'a>(&'a self, query: Q) -> BoxFuture<'a, Result<Vec<D>, SearchError>>
    where
        Self: Sync,
        S: Send + 'a,
        D: Send + 'a,
        Q: 'a,
    {
        let pending = query.fetch_async();
        Box::pin(async move {
            let rows = pending.await?;
            Ok(rows.into_iter().map(|source| self.map(source)).collect())
        })
    }
}

/// Source and destination share one shape: records pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<S, Q: Queryable<S>> Projector<S, S, Q> for Identity {
    fn map(&self, source: S) -> S {
        source
    }

    fn project(&self, query: Q) -> Result<Vec<S>, SearchError> {
        query.fetch()
    }

    fn project_async<'a>(&'a self, query: Q) -> BoxFuture<'a, Result<Vec<S>, SearchError>>
    where
        Self: Sync,
        S: Send + 'a,
        Q: 'a,
    {
        query.fetch_async()
    }
}

/// Projector built from a conversion closure, usable with any store.
pub struct MapProjector<S, D, F> {
    convert: F,
    _shape: PhantomData<fn(S) -> D>,
}

impl<S, D, F> MapProjector<S, D, F>
where
    F: Fn(S) -> D,
{
    pub fn new(convert: F) -> Self {
        Self {
            convert,
            _shape: PhantomData,
        }
    }
}

impl<S, D, F, Q> Projector<S, D, Q> for MapProjector<S, D, F>
where
    F: Fn(S) -> D,
    Q: Queryable<S>,
{
    fn map(&self, source: S) -> D {
        (self.convert)(source)
    }
}
