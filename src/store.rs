use either::Either;

/// A fixed-capacity block of `B` slots. Once allocated, its slots never move,
/// no matter how the owning index array is rearranged.
pub(crate) type Bucket<T> = Box<[T]>;

pub(crate) fn new_bucket<T: Default, const B: usize>() -> Bucket<T> {
    (0..B).map(|_| T::default()).collect()
}

/// The circular index array of owned buckets.
pub(crate) struct BucketStore<T, const B: usize> {
    buckets: Vec<Bucket<T>>,
}

impl<T: Clone, const B: usize> Clone for BucketStore<T, B> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if self.buckets.len() != source.buckets.len() {
            *self = source.clone();
            return
        }
        let iter = self.buckets.iter_mut().zip(source.buckets.iter());
        for (dst, src) in iter {
            dst.clone_from_slice(src);
        }
    }
}

impl<T, const B: usize> BucketStore<T, B> {
    /// Number of slots in the index array.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn bucket(&self, index: usize) -> &[T] {
        &self.buckets[index]
    }

    #[inline]
    pub(crate) fn bucket_mut(&mut self, index: usize) -> &mut [T] {
        &mut self.buckets[index]
    }

    /// Swaps two `(bucket, offset)` slots.
    pub(crate) fn swap(&mut self, a: (usize, usize), b: (usize, usize)) {
        if a.0 == b.0 {
            self.buckets[a.0].swap(a.1, b.1);
        } else {
            let (lo, hi) = if a.0 < b.0 { (a, b) } else { (b, a) };
            let (head, tail) = self.buckets.split_at_mut(hi.0);
            core::mem::swap(&mut head[lo.0][lo.1], &mut tail[0][hi.1]);
        }
    }

    /// Buckets from `begin` to `end` inclusive, walking circularly.
    pub(crate) fn range(
        &self,
        begin: usize,
        end: usize,
    ) -> impl DoubleEndedIterator<Item = &[T]> + '_ {
        let iter = if begin <= end {
            Either::Left(self.buckets[begin..=end].iter())
        } else {
            let (head, tail) = self.buckets.split_at(begin);
            Either::Right(tail.iter().chain(head[..=end].iter()))
        };
        Iterator::map(iter, |bucket| &bucket[..])
    }

    /// Same as [`range`](Self::range), but yields mutable buckets.
    pub(crate) fn range_mut(
        &mut self,
        begin: usize,
        end: usize,
    ) -> impl DoubleEndedIterator<Item = &mut [T]> + '_ {
        let iter = if begin <= end {
            Either::Left(self.buckets[begin..=end].iter_mut())
        } else {
            let (head, tail) = self.buckets.split_at_mut(begin);
            Either::Right(tail.iter_mut().chain(head[..=end].iter_mut()))
        };
        Iterator::map(iter, |bucket| &mut bucket[..])
    }
}

impl<T: Default, const B: usize> BucketStore<T, B> {
    /// Allocates an index array of `len` slots, each with a fresh bucket.
    pub(crate) fn with_buckets(len: usize) -> Self {
        assert!(B > 0, "BucketDeque bucket size must be non-zero");
        Self {
            buckets: (0..len).map(|_| new_bucket::<T, B>()).collect(),
        }
    }

    /// Doubles the index array. The live range must cover every slot and
    /// start at `begin`.
    ///
    /// The existing buckets are moved, not copied, into the middle of the new
    /// array in live order, with fresh buckets on both sides so that the next
    /// roll in either direction lands on an unused bucket. Returns the new
    /// `(begin, end)`.
    pub(crate) fn grow(&mut self, begin: usize) -> (usize, usize) {
        let len = self.buckets.len();
        let headroom = len / 2;

        let mut live = std::mem::take(&mut self.buckets);
        live.rotate_left(begin);

        let mut buckets = Vec::with_capacity(2 * len);
        buckets.extend((0..headroom).map(|_| new_bucket::<T, B>()));
        buckets.append(&mut live);
        buckets.extend((0..2 * len - headroom - len).map(|_| new_bucket::<T, B>()));
        self.buckets = buckets;

        (headroom, headroom + len - 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_grow_keeps_buckets() {
        let mut store = BucketStore::<u32, 4>::with_buckets(4);
        for i in 0..4 {
            store.bucket_mut(i)[0] = i as u32;
        }
        let addrs: Vec<*const u32> = (0..4).map(|i| store.bucket(i).as_ptr()).collect();

        let (begin, end) = store.grow(3);
        assert_eq!((begin, end), (2, 5));
        assert_eq!(store.len(), 8);

        let moved: Vec<u32> = store.range(begin, end).map(|b| b[0]).collect();
        assert_eq!(moved, [3, 0, 1, 2]);
        for (offset, i) in [3, 0, 1, 2].into_iter().enumerate() {
            assert_eq!(store.bucket(begin + offset).as_ptr(), addrs[i]);
        }
        for i in (0..begin).chain(end + 1..8) {
            assert_eq!(store.bucket(i).len(), 4);
            assert!(store.bucket(i).iter().all(|x| *x == 0));
        }
    }

    #[test]
    fn test_grow_from_two() {
        let mut store = BucketStore::<u8, 1>::with_buckets(2);
        store.bucket_mut(0)[0] = 1;
        store.bucket_mut(1)[0] = 2;
        let (begin, end) = store.grow(1);
        assert_eq!((begin, end), (1, 2));
        let values: Vec<u8> = store.range(0, 3).map(|b| b[0]).collect();
        assert_eq!(values, [0, 2, 1, 0]);
    }

    #[test]
    fn test_range_wraps() {
        let mut store = BucketStore::<u8, 2>::with_buckets(4);
        for i in 0..4 {
            store.bucket_mut(i)[1] = i as u8;
        }
        let values: Vec<u8> = store.range(2, 0).map(|b| b[1]).collect();
        assert_eq!(values, [2, 3, 0]);
        let values: Vec<u8> = store.range(1, 1).map(|b| b[1]).collect();
        assert_eq!(values, [1]);
        for bucket in store.range_mut(3, 1) {
            bucket[0] = 9;
        }
        let values: Vec<u8> = store.range(0, 3).map(|b| b[0]).collect();
        assert_eq!(values, [9, 9, 0, 9]);
    }

    #[test]
    fn test_clone_from_reuses_buckets() {
        let mut src = BucketStore::<u8, 2>::with_buckets(2);
        src.bucket_mut(1)[1] = 7;
        let mut dst = BucketStore::<u8, 2>::with_buckets(2);
        let addr = dst.bucket(1).as_ptr();
        dst.clone_from(&src);
        assert_eq!(dst.bucket(1), &[0, 7]);
        assert_eq!(dst.bucket(1).as_ptr(), addr);

        let mut small = BucketStore::<u8, 2>::with_buckets(2);
        let big = BucketStore::<u8, 2>::with_buckets(8);
        small.clone_from(&big);
        assert_eq!(small.len(), 8);
    }
}
