use anyhow::Error;
use ndarray::Array2;
use crate::utils::coordinate::Landmark;

/// landmarks_to_ndarray packs landmarks into an `(n, 3)` array of x, y, z.
pub fn landmarks_to_ndarray(landmarks: &[Landmark]) -> Array2<f32> {
    let mut result: Vec<f32> = Vec::with_capacity(landmarks.len() * 3);
    for lmk in landmarks {
        result.extend_from_slice(&[lmk.x, lmk.y, lmk.z]);
    }
    Array2::from_shape_vec((landmarks.len(), 3), result)
        .unwrap_or_else(|_| Array2::zeros((0, 3)))
}

/// ndarray_to_landmarks unpacks an `(n, 3)` array, taking visibility from
/// the matching entry of `template`.
///
/// # Arguments
/// * `arr` - Array2<f32> with x, y, z columns
/// * `template` - landmarks supplying visibility, same length as `arr`
///
/// # Returns
/// * `Result<Vec<Landmark>, Error>`
pub fn ndarray_to_landmarks(arr: &Array2<f32>, template: &[Landmark]) -> Result<Vec<Landmark>, Error> {
    if arr.ncols() != 3 {
        return Err(Error::msg(format!("expected 3 columns, got {}", arr.ncols())))
    }
    if arr.nrows() != template.len() {
        return Err(Error::msg(format!(
            "array has {} rows but template has {} landmarks",
            arr.nrows(),
            template.len()
        )))
    }

    let landmarks = arr
        .outer_iter()
        .zip(template)
        .map(|(row, lmk)| Landmark {
            x: row[0],
            y: row[1],
            z: row[2],
            visibility: lmk.visibility,
        })
        .collect();
    Ok(landmarks)
}
