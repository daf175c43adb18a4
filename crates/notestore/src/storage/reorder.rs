//! Index-set operations over an ordered collection.
//!
//! Both operations resolve every index against the sequence as it was before
//! the call and validate all of them before touching anything, so a rejected
//! call leaves the sequence unchanged.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Remove every element whose position is in `indices`.
///
/// Returns the removed elements in their original order.
///
/// # Errors
///
/// Returns [`Error::IndexOutOfRange`] for the largest index if it is not a
/// valid position.
pub fn remove_at<T>(items: &mut Vec<T>, indices: &BTreeSet<usize>) -> Result<Vec<T>> {
    check_in_range(items.len(), indices)?;

    let (removed, kept) = partition(std::mem::take(items), indices);
    *items = kept;
    Ok(removed)
}

/// Move the elements at `from` as one block so it starts at position `to` of
/// the resulting sequence.
///
/// The block keeps its internal order and so do the elements around it. `to`
/// is a final position: it may range from `0` to `len - from.len()`.
///
/// ```
/// use std::collections::BTreeSet;
/// use notestore::storage::reorder::move_block;
///
/// let mut items = vec!['A', 'B', 'C', 'D', 'E'];
/// move_block(&mut items, &BTreeSet::from([1]), 3).unwrap();
/// assert_eq!(items, ['A', 'C', 'D', 'B', 'E']);
/// ```
///
/// # Errors
///
/// Returns [`Error::IndexOutOfRange`] if a source index or the destination is
/// not a valid position.
pub fn move_block<T>(items: &mut Vec<T>, from: &BTreeSet<usize>, to: usize) -> Result<()> {
    let len = items.len();
    check_in_range(len, from)?;
    if to > len - from.len() {
        return Err(Error::index_out_of_range(to, len));
    }

    let (block, mut rest) = partition(std::mem::take(items), from);
    let tail = rest.split_off(to);
    rest.extend(block);
    rest.extend(tail);
    *items = rest;
    Ok(())
}

/// Translate a drop offset into a final position for [`move_block`].
///
/// List widgets usually report a drag destination as an offset into the
/// sequence *before* the move (insert before the element currently at
/// `offset`). Sources above that offset no longer count once they are lifted.
#[must_use]
pub fn destination_from_offset(from: &BTreeSet<usize>, offset: usize) -> usize {
    offset - from.range(..offset).count()
}

fn check_in_range(len: usize, indices: &BTreeSet<usize>) -> Result<()> {
    match indices.last() {
        Some(&index) if index >= len => Err(Error::index_out_of_range(index, len)),
        _ => Ok(()),
    }
}

fn partition<T>(items: Vec<T>, indices: &BTreeSet<usize>) -> (Vec<T>, Vec<T>) {
    let mut selected = Vec::with_capacity(indices.len());
    let mut rest = Vec::with_capacity(items.len().saturating_sub(indices.len()));
    for (position, item) in items.into_iter().enumerate() {
        if indices.contains(&position) {
            selected.push(item);
        } else {
            rest.push(item);
        }
    }
    (selected, rest)
}
