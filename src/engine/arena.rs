//! Frame-scoped pools of draw records.
//!
//! A pool hands out one slot at a time: [`ArenaPool::get_new`] opens a
//! transaction on the next free slot, and [`ArenaPool::commit`] keeps it or
//! [`ArenaPool::rollback`] gives it back.  [`ArenaPool::init`] forgets the
//! previous frame but keeps every slot allocated.
//!
//! Committed records are chained into per-floor lists through the [`Link`]
//! every record carries; lists hold [`Handle`]s, never references.

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{Index, IndexMut},
};

use log::warn;
use thiserror::Error;

/// Which pool a record lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Wall,
    Plane,
    Thing,
    Floor,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Wall => "wall",
            RecordKind::Plane => "plane",
            RecordKind::Thing => "thing",
            RecordKind::Floor => "floor",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArenaError {
    #[error("{0} pool: get_new while a transaction is already open")]
    AlreadyOpen(RecordKind),

    #[error("{0} pool: commit/rollback without an open transaction")]
    NoTransaction(RecordKind),

    #[error("{0} pool: slot {1} is not a committed record of this frame")]
    NotCommitted(RecordKind, usize),

    #[error("{0} pool: slot {1} is already in a list")]
    AlreadyLinked(RecordKind, usize),
}

/// A record type that can live in an [`ArenaPool`].
///
/// `Default` is the zeroed state every reused slot starts from.
pub trait DrawRecord: Default + Sized {
    const KIND: RecordKind;

    fn link(&self) -> &Link<Self>;
    fn link_mut(&mut self) -> &mut Link<Self>;
}

/*──────────────────────────── Handles ──────────────────────────────*/

/// Typed slot index into one pool.
pub struct Handle<T> {
    idx: u32,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    #[inline]
    fn new(idx: usize) -> Self {
        Self {
            idx: idx as u32,
            _kind: PhantomData,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.idx as usize
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.idx)
    }
}

/*──────────────────────────── Lists ────────────────────────────────*/

/// Intrusive list links, stored inside the record.
pub struct Link<T> {
    pub next: Option<Handle<T>>,
    pub prev: Option<Handle<T>>,
    linked: bool,
}

impl<T> Link<T> {
    /// Set once the record has been appended to a list this frame.
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked
    }
}

impl<T> Default for Link<T> {
    fn default() -> Self {
        Self {
            next: None,
            prev: None,
            linked: false,
        }
    }
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            prev: self.prev,
            linked: self.linked,
        }
    }
}

impl<T> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("next", &self.next)
            .field("prev", &self.prev)
            .field("linked", &self.linked)
            .finish()
    }
}

/// Head/tail of a chain of committed records, in append order.
pub struct RecordList<T> {
    pub head: Option<Handle<T>>,
    pub tail: Option<Handle<T>>,
    pub len: usize,
}

impl<T> RecordList<T> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for RecordList<T> {
    fn default() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }
}

impl<T> Clone for RecordList<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head,
            tail: self.tail,
            len: self.len,
        }
    }
}

impl<T> fmt::Debug for RecordList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordList")
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("len", &self.len)
            .finish()
    }
}

/*──────────────────────────── Pool ─────────────────────────────────*/

#[derive(Debug)]
pub struct ArenaPool<T> {
    slots: Vec<T>,
    committed: usize,
    open: bool,
}

impl<T: DrawRecord> Default for ArenaPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DrawRecord> ArenaPool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            committed: 0,
            open: false,
        }
    }

    /// Start a new frame: nothing committed, slots kept for reuse.
    pub fn init(&mut self) {
        if self.open {
            warn!("{} pool: dropping a transaction left open by the last frame", T::KIND);
            self.open = false;
        }
        self.committed = 0;
    }

    /// Open a transaction on a zeroed slot.  The slot is not committed and
    /// sits in no list until [`Self::try_commit`].
    pub fn try_get_new(&mut self) -> Result<Handle<T>, ArenaError> {
        if self.open {
            return Err(ArenaError::AlreadyOpen(T::KIND));
        }
        let idx = self.committed;
        if idx < self.slots.len() {
            self.slots[idx] = T::default();
        } else {
            self.slots.push(T::default());
        }
        self.open = true;
        Ok(Handle::new(idx))
    }

    /// Keep the pending record; returns its handle.
    pub fn try_commit(&mut self) -> Result<Handle<T>, ArenaError> {
        if !self.open {
            return Err(ArenaError::NoTransaction(T::KIND));
        }
        self.open = false;
        self.committed += 1;
        Ok(Handle::new(self.committed - 1))
    }

    /// Discard the pending record; its slot is handed out again next.
    pub fn try_rollback(&mut self) -> Result<(), ArenaError> {
        if !self.open {
            return Err(ArenaError::NoTransaction(T::KIND));
        }
        self.open = false;
        Ok(())
    }

    /// # Panics
    /// If a transaction is already open on this pool.
    pub fn get_new(&mut self) -> Handle<T> {
        match self.try_get_new() {
            Ok(h) => h,
            Err(e) => panic!("{e}"),
        }
    }

    /// # Panics
    /// If no transaction is open.
    pub fn commit(&mut self) -> Handle<T> {
        match self.try_commit() {
            Ok(h) => h,
            Err(e) => panic!("{e}"),
        }
    }

    /// # Panics
    /// If no transaction is open.
    pub fn rollback(&mut self) {
        if let Err(e) = self.try_rollback() {
            panic!("{e}");
        }
    }

    /// The record of the open transaction.
    pub fn pending_mut(&mut self) -> Option<&mut T> {
        if self.open {
            self.slots.get_mut(self.committed)
        } else {
            None
        }
    }

    /// This frame's records in commit order.
    #[inline]
    pub fn committed(&self) -> &[T] {
        &self.slots[..self.committed]
    }

    #[inline]
    pub fn committed_len(&self) -> usize {
        self.committed
    }

    /// Slots allocated so far (committed or not).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    fn live(&self, h: Handle<T>) -> bool {
        h.index() < self.committed + self.open as usize
    }

    /// A committed or pending record; `None` for stale handles.
    pub fn get(&self, h: Handle<T>) -> Option<&T> {
        if self.live(h) {
            self.slots.get(h.index())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, h: Handle<T>) -> Option<&mut T> {
        if self.live(h) {
            self.slots.get_mut(h.index())
        } else {
            None
        }
    }

    /// Link a committed record at the tail of `list`.  A record joins at
    /// most one list per frame; pending and stale handles are refused.
    pub fn try_append(&mut self, list: &mut RecordList<T>, h: Handle<T>) -> Result<(), ArenaError> {
        if h.index() >= self.committed {
            return Err(ArenaError::NotCommitted(T::KIND, h.index()));
        }
        if self.slots[h.index()].link().linked || list.tail == Some(h) {
            return Err(ArenaError::AlreadyLinked(T::KIND, h.index()));
        }
        {
            let link = self.slots[h.index()].link_mut();
            link.prev = list.tail;
            link.next = None;
            link.linked = true;
        }
        match list.tail {
            Some(tail) => self.slots[tail.index()].link_mut().next = Some(h),
            None => list.head = Some(h),
        }
        list.tail = Some(h);
        list.len += 1;
        Ok(())
    }

    /// # Panics
    /// If `h` is not committed this frame or is already in a list.
    pub fn append(&mut self, list: &mut RecordList<T>, h: Handle<T>) {
        if let Err(e) = self.try_append(list, h) {
            panic!("{e}");
        }
    }

    /// Walk `list` from head to tail.  Stops at the first handle that is no
    /// longer committed, so a list kept past [`Self::init`] yields nothing.
    pub fn iter_list<'a>(
        &'a self,
        list: &RecordList<T>,
    ) -> impl Iterator<Item = (Handle<T>, &'a T)> + 'a {
        let mut cur = list.head;
        std::iter::from_fn(move || {
            let h = cur.take().filter(|h| h.index() < self.committed)?;
            let rec = &self.slots[h.index()];
            cur = rec.link().next;
            Some((h, rec))
        })
    }
}

impl<T> Index<Handle<T>> for ArenaPool<T> {
    type Output = T;

    #[inline]
    fn index(&self, h: Handle<T>) -> &T {
        &self.slots[h.index()]
    }
}

impl<T> IndexMut<Handle<T>> for ArenaPool<T> {
    #[inline]
    fn index_mut(&mut self, h: Handle<T>) -> &mut T {
        &mut self.slots[h.index()]
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
