use anyhow::Result;

/// Indexable input whose elements can be transformed independently.
///
/// `transform` is called at most once per index, from arbitrary threads and in
/// no particular order, so it must not depend on other indices' side effects.
pub trait Transformer: Sync {
    type Output: Send;

    /// Number of elements; indices `0..len()` are transformed.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn transform(&self, index: usize) -> Result<Self::Output>;
}

/// Unordered sink. Only the merge loop touches it, so it needs no locking.
pub trait Appender<T> {
    fn append(&mut self, value: T);

    fn append_batch<B>(&mut self, batch: B)
    where
        B: IntoIterator<Item = T>,
    {
        for value in batch {
            self.append(value);
        }
    }
}

/// Pre-sized sink addressed by position.
///
/// Callers size the sink before the run; nothing checks bounds on their behalf.
pub trait Injector<T> {
    fn inject_at(&mut self, index: usize, value: T);
}

impl<T> Appender<T> for Vec<T> {
    fn append(&mut self, value: T) {
        self.push(value);
    }

    fn append_batch<B>(&mut self, batch: B)
    where
        B: IntoIterator<Item = T>,
    {
        self.extend(batch);
    }
}

impl<T> Injector<T> for [T] {
    fn inject_at(&mut self, index: usize, value: T) {
        self[index] = value;
    }
}

impl<T> Injector<T> for Vec<T> {
    fn inject_at(&mut self, index: usize, value: T) {
        self[index] = value;
    }
}

/// `Transformer` built from a length and a closure.
pub struct TransformFn<F> {
    len: usize,
    f: F,
}

pub fn transform_fn<T, F>(len: usize, f: F) -> TransformFn<F>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync,
{
    TransformFn { len, f }
}

impl<T, F> Transformer for TransformFn<F>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync,
{
    type Output = T;

    fn len(&self) -> usize {
        self.len
    }

    fn transform(&self, index: usize) -> Result<T> {
        (self.f)(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_fn() {
        let squares = transform_fn(3, |i| Ok(i * i));
        assert_eq!(squares.len(), 3);
        assert!(!squares.is_empty());
        assert_eq!(squares.transform(2).unwrap(), 4);
        assert!(transform_fn(0, |i| Ok(i)).is_empty());
    }

    #[test]
    fn test_vec_appender_batches() {
        // Vec::append is inherent, so go through the trait explicitly.
        let mut sink: Vec<u32> = Vec::new();
        Appender::append(&mut sink, 1);
        sink.append_batch(vec![2, 3]);
        sink.append_batch(Vec::<u32>::new());
        assert_eq!(sink, vec![1, 2, 3]);
    }

    #[test]
    fn test_slice_injector_overwrites_position() {
        let mut sink = vec![0u32; 3];
        sink.inject_at(2, 9);
        sink.as_mut_slice().inject_at(0, 7);
        assert_eq!(sink, vec![7, 0, 9]);
    }
}
