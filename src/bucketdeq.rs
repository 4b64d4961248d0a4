use core::hash::{Hash, Hasher};
use core::ops::{Index, IndexMut};
use std::collections::VecDeque;

use crate::{
    ring,
    store::BucketStore,
    BUCKET_SIZE,
};

/// A double-ended queue stored in fixed-size buckets of `B` elements.
///
/// Buckets are reached through a circular index array that doubles when the
/// live range wraps onto itself. Growth moves bucket handles, never bucket
/// contents, so a reference obtained to an element points to the same memory
/// until that element is popped.
///
/// ```
/// # use bucketdeq::BucketDeque;
/// let mut d: BucketDeque<i32> = BucketDeque::new();
/// d.push_back(1);
/// d.push_front(0);
/// let addr: *const i32 = &d[1];
/// d.extend(2..10_000);
/// assert!(std::ptr::eq(addr, &d[1]));
/// assert_eq!(d.len(), 10_000);
/// ```
pub struct BucketDeque<T, const B: usize = BUCKET_SIZE> {
    store: BucketStore<T, B>,
    /// Bucket holding the first live element.
    begin: usize,
    /// Bucket holding the last live element.
    end:   usize,
    /// Offset of the first live element in `begin`. `0` means the bucket is
    /// used up towards the front and the next front push rolls backward.
    front: usize,
    /// Offset one past the last live element in `end`. `B` means the next
    /// back push rolls forward.
    back:  usize,
}

impl<T: Clone, const B: usize> Clone for BucketDeque<T, B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            begin: self.begin,
            end:   self.end,
            front: self.front,
            back:  self.back,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.store.clone_from(&source.store);
        self.begin = source.begin;
        self.end = source.end;
        self.front = source.front;
        self.back = source.back;
    }
}

impl<T: Default, const B: usize> Default for BucketDeque<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

struct IterWithLen<I> {
    iter: I,
    len:  usize,
}

impl<I> Iterator for IterWithLen<I>
where
    I: Iterator,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let elem = self.iter.next()?;
        self.len -= 1;
        Some(elem)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<I> DoubleEndedIterator for IterWithLen<I>
where
    I: DoubleEndedIterator,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let elem = self.iter.next_back()?;
        self.len -= 1;
        Some(elem)
    }
}

impl<I> ExactSizeIterator for IterWithLen<I>
where
    I: Iterator,
{
    fn len(&self) -> usize {
        self.len
    }
}

impl<T, const B: usize> BucketDeque<T, B> {
    /// Maps a logical index to its `(bucket, offset)` slot.
    ///
    /// Indices past the end map to some slot without being checked.
    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        let lead = B - self.front;
        if index < lead {
            (self.begin, self.front + index)
        } else {
            let rest = index - lead;
            ((self.begin + rest / B + 1) % self.store.len(), rest % B)
        }
    }

    #[inline]
    fn span(&self) -> usize {
        ring::span(self.begin, self.end, self.store.len())
    }

    /// Number of elements in the `BucketDeque`.
    ///
    /// Computed from the cursors: elements in the leading bucket, plus full
    /// buckets in between, plus elements in the trailing bucket.
    #[inline]
    pub fn len(&self) -> usize {
        match self.span() {
            1 => self.back - self.front,
            span => (B - self.front) + (span - 2) * B + self.back,
        }
    }

    /// If the `BucketDeque` is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of slots across all allocated buckets.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.len() * B
    }

    /// Length of the bucket index array.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.store.len()
    }

    /// Provides a reference to the element at the given index.
    ///
    /// Index 0 is the front of the `BucketDeque`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len() {
            let (bucket, offset) = self.locate(index);
            self.store.bucket(bucket).get(offset)
        } else {
            None
        }
    }

    /// Provides a mutable reference to the element at the given index.
    ///
    /// Index 0 is the front of the `BucketDeque`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len() {
            let (bucket, offset) = self.locate(index);
            self.store.bucket_mut(bucket).get_mut(offset)
        } else {
            None
        }
    }

    /// Provides a reference to the front element, or `None` if the
    /// `BucketDeque` is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Provides a mutable reference to the front element, or `None` if the
    /// `BucketDeque` is empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Provides a reference to the back element, or `None` if the
    /// `BucketDeque` is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Provides a mutable reference to the back element, or `None` if the
    /// `BucketDeque` is empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let index = self.len().checked_sub(1)?;
        self.get_mut(index)
    }

    /// Returns the live part of every touched bucket, front to back.
    ///
    /// The leading and trailing slices may be empty.
    pub fn buckets(&self) -> impl DoubleEndedIterator<Item = &[T]> + ExactSizeIterator + '_ {
        let span = self.span();
        let (front, back) = (self.front, self.back);
        let iter = IterWithLen {
            iter: self.store.range(self.begin, self.end),
            len:  span,
        };
        iter.enumerate().map(move |(i, bucket)| {
            let start = if i == 0 { front } else { 0 };
            let end = if i + 1 == span { back } else { B };
            &bucket[start..end]
        })
    }

    /// Same as [`buckets`](Self::buckets), but returns mutable slices.
    pub fn buckets_mut(
        &mut self,
    ) -> impl DoubleEndedIterator<Item = &mut [T]> + ExactSizeIterator + '_ {
        let span = self.span();
        let (front, back) = (self.front, self.back);
        let iter = IterWithLen {
            iter: self.store.range_mut(self.begin, self.end),
            len:  span,
        };
        iter.enumerate().map(move |(i, bucket)| {
            let start = if i == 0 { front } else { 0 };
            let end = if i + 1 == span { back } else { B };
            &mut bucket[start..end]
        })
    }

    /// Returns an iterator over the elements of the `BucketDeque`.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        IterWithLen {
            len:  self.len(),
            iter: self.buckets().flat_map(|bucket| bucket.iter()),
        }
    }

    /// Returns an iterator over the elements of the `BucketDeque`.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> + ExactSizeIterator + '_ {
        IterWithLen {
            len:  self.len(),
            iter: self.buckets_mut().flat_map(|bucket| bucket.iter_mut()),
        }
    }

    /// Swap elements at indices `a` and `b`.
    ///
    /// `a` and `b` may be equal. Element at index 0 is the front of the
    /// `BucketDeque`.
    ///
    /// # Panics
    ///
    /// Panics if `a` or `b` are out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) {
        let len = self.len();
        assert!(a < len);
        assert!(b < len);
        if a != b {
            let a = self.locate(a);
            let b = self.locate(b);
            self.store.swap(a, b);
        }
    }

    /// Exchanges the contents of two deques in O(1). No bucket is copied or
    /// reallocated.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }
}

impl<T: Default, const B: usize> BucketDeque<T, B> {
    /// Makes a new, empty `BucketDeque` with two buckets, the live range
    /// poised between them.
    ///
    /// # Panics
    ///
    /// Panics if `B` is zero.
    pub fn new() -> Self {
        Self {
            store: BucketStore::with_buckets(2),
            begin: 0,
            end:   1,
            front: B,
            back:  0,
        }
    }

    /// Makes a new, empty `BucketDeque` that can take `count` back pushes
    /// without growing.
    ///
    /// ```
    /// # use bucketdeq::BucketDeque;
    /// let mut d = BucketDeque::<u8, 4>::with_capacity(10);
    /// let buckets = d.bucket_count();
    /// d.extend(0..10);
    /// assert_eq!(d.bucket_count(), buckets);
    /// ```
    pub fn with_capacity(count: usize) -> Self {
        let needed = count
            .checked_div(B)
            .map_or(0, |full| full + usize::from(count % B != 0));
        let len = core::cmp::max(2, needed + 1);
        Self {
            store: BucketStore::with_buckets(len),
            begin: len / 2 - 1,
            end:   len / 2,
            front: B,
            back:  0,
        }
    }

    /// Remove all elements from the `BucketDeque` and release every bucket,
    /// leaving the same layout as [`new`](Self::new).
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Appends an element to the back of the `BucketDeque`.
    pub fn push_back(&mut self, item: T) {
        if self.back == B {
            let mut next = ring::wrap_add(self.end, 1, self.store.len());
            if next == self.begin {
                let (begin, end) = self.store.grow(self.begin);
                self.begin = begin;
                next = end + 1;
            }
            self.end = next;
            self.back = 0;
        }
        self.store.bucket_mut(self.end)[self.back] = item;
        self.back += 1;
    }

    /// Prepends an element to the front of the `BucketDeque`.
    pub fn push_front(&mut self, item: T) {
        if self.front == 0 {
            let mut prev = ring::wrap_sub(self.begin, 1, self.store.len());
            if prev == self.end {
                let (begin, end) = self.store.grow(self.begin);
                self.end = end;
                prev = begin - 1;
            }
            self.begin = prev;
            self.front = B;
        }
        self.front -= 1;
        self.store.bucket_mut(self.begin)[self.front] = item;
    }

    /// Remove the last element from the `BucketDeque` and return it, or
    /// `None` if it is empty.
    ///
    /// Buckets are kept for reuse; the index array never shrinks.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None
        }
        if self.back == 0 {
            self.end = ring::wrap_sub(self.end, 1, self.store.len());
            self.back = B;
        }
        self.back -= 1;
        Some(core::mem::take(&mut self.store.bucket_mut(self.end)[self.back]))
    }

    /// Remove the first element from the `BucketDeque` and return it, or
    /// `None` if it is empty.
    ///
    /// Buckets are kept for reuse; the index array never shrinks.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None
        }
        if self.front == B {
            self.begin = ring::wrap_add(self.begin, 1, self.store.len());
            self.front = 0;
        }
        let item = core::mem::take(&mut self.store.bucket_mut(self.begin)[self.front]);
        self.front += 1;
        Some(item)
    }

    /// Shortens the deque, keeping the first `len` elements and dropping the
    /// rest.
    ///
    /// If `len` is greater than the deque's current length, this has no
    /// effect.
    pub fn truncate(&mut self, len: usize) {
        while self.len() > len {
            self.pop_back();
        }
    }
}

/// Unchecked in release builds: an index past [`len`](BucketDeque::len)
/// reads an unspecified slot or panics. Use [`get`](BucketDeque::get) for a
/// checked lookup.
impl<T, const B: usize> Index<usize> for BucketDeque<T, B> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        debug_assert!(index < self.len(), "BucketDeque index out of bounds");
        let (bucket, offset) = self.locate(index);
        &self.store.bucket(bucket)[offset]
    }
}

impl<T, const B: usize> IndexMut<usize> for BucketDeque<T, B> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len(), "BucketDeque index out of bounds");
        let (bucket, offset) = self.locate(index);
        &mut self.store.bucket_mut(bucket)[offset]
    }
}

impl<T: Default, const B: usize> Extend<T> for BucketDeque<T, B> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T: Default + Copy + 'a, const B: usize> Extend<&'a T> for BucketDeque<T, B> {
    #[inline]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl<T: Default, const B: usize> FromIterator<T> for BucketDeque<T, B> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut deque = Self::with_capacity(iter.size_hint().0);
        deque.extend(iter);
        deque
    }
}

impl<T: Default, const B: usize, const N: usize> From<[T; N]> for BucketDeque<T, B> {
    fn from(array: [T; N]) -> Self {
        let mut deque = Self::with_capacity(N);
        deque.extend(array);
        deque
    }
}

impl<T: Default, const B: usize> From<Vec<T>> for BucketDeque<T, B> {
    fn from(vec: Vec<T>) -> Self {
        let mut deque = Self::with_capacity(vec.len());
        deque.extend(vec);
        deque
    }
}

/// An owning iterator over the elements of a [`BucketDeque`], front to back.
pub struct IntoIter<T, const B: usize = BUCKET_SIZE> {
    inner: BucketDeque<T, B>,
}

impl<T: Default, const B: usize> Iterator for IntoIter<T, B> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len();
        (len, Some(len))
    }
}

impl<T: Default, const B: usize> DoubleEndedIterator for IntoIter<T, B> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.pop_back()
    }
}

impl<T: Default, const B: usize> ExactSizeIterator for IntoIter<T, B> {}

impl<T: Default, const B: usize> IntoIterator for BucketDeque<T, B> {
    type Item = T;
    type IntoIter = IntoIter<T, B>;

    fn into_iter(self) -> IntoIter<T, B> {
        IntoIter { inner: self }
    }
}

impl<T: PartialEq, const B: usize, const C: usize> PartialEq<BucketDeque<T, C>>
    for BucketDeque<T, B>
{
    #[inline]
    fn eq(&self, other: &BucketDeque<T, C>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, const B: usize> Eq for BucketDeque<T, B> {}

impl<T: PartialEq, const B: usize> PartialEq<&[T]> for BucketDeque<T, B> {
    #[inline]
    fn eq(&self, other: &&[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: PartialEq, const B: usize, const N: usize> PartialEq<[T; N]> for BucketDeque<T, B> {
    #[inline]
    fn eq(&self, other: &[T; N]) -> bool {
        self.len() == N && self.iter().eq(other.iter())
    }
}

impl<T: PartialEq, const B: usize, const N: usize> PartialEq<&[T; N]> for BucketDeque<T, B> {
    #[inline]
    fn eq(&self, other: &&[T; N]) -> bool {
        self.len() == N && self.iter().eq(other.iter())
    }
}

impl<T: PartialEq, const B: usize> PartialEq<Vec<T>> for BucketDeque<T, B> {
    #[inline]
    fn eq(&self, other: &Vec<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: PartialEq, const B: usize> PartialEq<VecDeque<T>> for BucketDeque<T, B> {
    #[inline]
    fn eq(&self, other: &VecDeque<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Hash, const B: usize> Hash for BucketDeque<T, B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        self.iter().for_each(|elem| elem.hash(state));
    }
}

impl<T, const B: usize> std::fmt::Debug for BucketDeque<T, B>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
/// Check that every slot outside the live range holds the default value.
pub(crate) fn check_spare<T, const B: usize>(d: &BucketDeque<T, B>)
where
    T: Default + PartialEq + std::fmt::Debug,
{
    let mut live = vec![vec![false; B]; d.store.len()];
    for index in 0..d.len() {
        let (bucket, offset) = d.locate(index);
        assert!(!live[bucket][offset], "slot {bucket}:{offset} mapped twice");
        live[bucket][offset] = true;
    }
    for (bucket, slots) in live.iter().enumerate() {
        assert_eq!(d.store.bucket(bucket).len(), B);
        for (offset, _) in slots.iter().enumerate().filter(|(_, live)| !**live) {
            assert_eq!(
                d.store.bucket(bucket)[offset],
                T::default(),
                "spare slot {bucket}:{offset}"
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    mod bucket_1 {
        use super::*;

        crate::gen_tests_internal!(BucketDeque, 1);
        crate::gen_tests!(BucketDeque, 1);
    }

    mod bucket_3 {
        use super::*;

        crate::gen_tests_internal!(BucketDeque, 3);
        crate::gen_tests!(BucketDeque, 3);
    }

    mod bucket_16 {
        use super::*;

        crate::gen_tests_internal!(BucketDeque, 16);
        crate::gen_tests!(BucketDeque, 16);
    }

    mod bucket_default {
        use super::*;

        crate::gen_tests_internal!(BucketDeque, BUCKET_SIZE);
        crate::gen_tests!(BucketDeque, BUCKET_SIZE);
    }

    #[test]
    fn test_addresses_survive_a_million_pushes() {
        const ITERATIONS: i32 = 1_000_000;
        let mut d: BucketDeque<i32> = BucketDeque::new();
        let mut addrs: Vec<*const i32> = Vec::new();
        for i in 0..ITERATIONS {
            d.push_back(i);
            addrs.push(&d[i as usize]);
        }
        for (i, addr) in addrs.into_iter().enumerate() {
            assert!(core::ptr::eq(addr, &d[i]));
            assert_eq!(d[i], i as i32);
        }
    }

    #[test]
    fn test_stress_against_vecdeque() {
        use rand::{Rng, SeedableRng};

        const ITERATIONS: i32 = 1_000_000;
        let mut d: BucketDeque<i32> = BucketDeque::new();
        let mut expected = VecDeque::new();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(735675);

        for i in 0..ITERATIONS {
            d.push_front(i);
            expected.push_front(i);
        }
        for _ in 0..ITERATIONS {
            let value: i32 = rng.gen();
            match rng.gen_range(1..=5) {
                1 => {
                    d.push_front(value);
                    expected.push_front(value);
                }
                2 => {
                    d.push_back(value);
                    expected.push_back(value);
                }
                3 => assert_eq!(d.pop_front(), expected.pop_front()),
                4 => assert_eq!(d.pop_back(), expected.pop_back()),
                _ => {
                    if !d.is_empty() {
                        let index = value.unsigned_abs() as usize % d.len();
                        assert_eq!(d[index], expected[index]);
                    }
                }
            }
        }
        assert_eq!(d, expected);
    }
}
