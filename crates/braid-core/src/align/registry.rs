//! Stream ownership, indexing, and id allocation.

use std::any::type_name;
use std::fmt;

use super::config::StreamConfig;
use super::stream::{Stream, StreamHandle};
use super::AlignError;
use crate::time::Time;

/// Identifier of a registered stream.
///
/// Ids are dense, starting at zero, assigned in registration order, and
/// stay valid for the lifetime of the aligner that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId(usize);

impl StreamId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the dense index backing this id.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owns all registered streams, indexed by [`StreamId`].
pub(crate) struct StreamRegistry {
    streams: Vec<Box<dyn StreamHandle>>,
}

impl StreamRegistry {
    pub(crate) fn new() -> Self {
        Self {
            streams: Vec::new(),
        }
    }

    /// Registers a new typed stream and returns its id.
    pub(crate) fn register<T: 'static>(
        &mut self,
        callback: Box<dyn FnMut(Time, T)>,
        config: StreamConfig,
    ) -> StreamId {
        let id = StreamId::new(self.streams.len());
        self.streams.push(Box::new(Stream::new(id, callback, config)));
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.streams.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Returns the type-erased stream at `id`.
    pub(crate) fn get(&self, id: StreamId) -> Result<&dyn StreamHandle, AlignError> {
        self.streams
            .get(id.index())
            .map(Box::as_ref)
            .ok_or(AlignError::InvalidStream {
                id: id.index(),
                registered: self.streams.len(),
            })
    }

    /// Returns the type-erased stream at `id`, mutably.
    pub(crate) fn get_mut(&mut self, id: StreamId) -> Result<&mut (dyn StreamHandle + '_), AlignError> {
        let registered = self.streams.len();
        match self.streams.get_mut(id.index()) {
            Some(handle) => Ok(handle.as_mut()),
            None => Err(AlignError::InvalidStream {
                id: id.index(),
                registered,
            }),
        }
    }

    /// Recovers the typed stream at `id` for a push of payload type `T`.
    pub(crate) fn get_typed_mut<T: 'static>(
        &mut self,
        id: StreamId,
    ) -> Result<&mut Stream<T>, AlignError> {
        let handle = self.get_mut(id)?;
        let expected = handle.payload_type();
        handle
            .as_any_mut()
            .downcast_mut::<Stream<T>>()
            .ok_or(AlignError::TypeMismatch {
                id: id.index(),
                expected,
                actual: type_name::<T>(),
            })
    }

    /// Iterates streams in registration order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (StreamId, &dyn StreamHandle)> {
        self.streams
            .iter()
            .enumerate()
            .map(|(index, handle)| (StreamId::new(index), handle.as_ref()))
    }

    /// Iterates streams in registration order, mutably.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (StreamId, &mut (dyn StreamHandle + '_))> + '_ {
        self.streams.iter_mut().enumerate().map(move |(index, handle)| {
            let handle: &mut (dyn StreamHandle + '_) = handle.as_mut();
            (StreamId::new(index), handle)
        })
    }
}
