use crate::error::{BoreholeError, Result};

// ---------------------------------------------------------------------------
// NaN-coherence mask
// ---------------------------------------------------------------------------

/// Mark positions where none of `arrays` holds a missing (NaN) value.
///
/// All arrays must share the length of the first one, otherwise
/// [`BoreholeError::ShapeMismatch`] is returned.  Indexing every input with
/// the resulting mask yields NaN-free, still-parallel sequences.
pub fn mask_all_nans(arrays: &[&[f64]]) -> Result<Vec<bool>> {
    let Some(first) = arrays.first() else {
        return Ok(Vec::new());
    };
    let len = first.len();
    if let Some(bad) = arrays.iter().find(|a| a.len() != len) {
        return Err(BoreholeError::ShapeMismatch {
            expected: len,
            found: bad.len(),
        });
    }

    Ok((0..len)
        .map(|i| arrays.iter().all(|a| !a[i].is_nan()))
        .collect())
}

/// Keep the entries of `values` whose mask flag is set.
pub fn apply_mask(values: &[f64], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(&v, _)| v)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_inputs_are_all_true() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert_eq!(mask_all_nans(&[&a[..], &b[..]]).unwrap(), vec![true; 3]);
    }

    #[test]
    fn nan_in_any_input_masks_position() {
        let domain = [1.0, 2.0, f64::NAN, 4.0];
        let signal = [1.0, f64::NAN, 3.0, 4.0];
        let mask = mask_all_nans(&[&domain[..], &signal[..]]).unwrap();
        assert_eq!(mask, vec![true, false, false, true]);
        assert_eq!(apply_mask(&domain, &mask), vec![1.0, 4.0]);
        assert_eq!(apply_mask(&signal, &mask), vec![1.0, 4.0]);
    }

    #[test]
    fn more_than_two_arrays() {
        let a = [0.0, 1.0, 2.0];
        let b = [0.0, 1.0, 2.0];
        let c = [f64::NAN, 1.0, 2.0];
        assert_eq!(mask_all_nans(&[&a[..], &b[..], &c[..]]).unwrap(), vec![false, true, true]);
    }

    #[test]
    fn infinities_are_not_missing() {
        let a = [f64::INFINITY, 1.0];
        assert_eq!(mask_all_nans(&[&a[..]]).unwrap(), vec![true, true]);
    }

    #[test]
    fn length_mismatch_fails() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 2.0];
        assert_eq!(
            mask_all_nans(&[&a[..], &b[..]]).unwrap_err(),
            BoreholeError::ShapeMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn no_arrays_gives_empty_mask() {
        assert!(mask_all_nans(&[]).unwrap().is_empty());
    }
}
