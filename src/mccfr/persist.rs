//! On-disk checkpoint I/O: dense `[NUM_INFO_SETS, ACTION_MAX]` float64 arrays written in the
//! standard uncompressed numeric-array file format (NPY), split into `<name>_p<playerIdx>.npy`
//! (average policy) and `<name>_state.npy` (raw regret).
//!
//! Hand-rolled directly against `byteorder` rather than a dedicated npy crate, covering only the
//! subset actually needed here: a fixed `<f8` dtype, a 2-D shape, no fortran order, no pickled
//! objects.

use crate::error::{McrError, McrResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use std::path::Path;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Writes `data` (row-major, `rows * cols` entries) as a `.npy` file.
pub fn save_array(path: impl AsRef<Path>, rows: usize, cols: usize, data: &[f64]) -> McrResult<()> {
    assert_eq!(data.len(), rows * cols, "save_array: data length does not match shape");
    let header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({rows}, {cols}), }}"
    );
    // NPY v1.0 requires the full header (magic + version + header length + header text) to be
    // padded with spaces and terminated with '\n' so that it is a multiple of 64 bytes.
    let prefix_len = MAGIC.len() + 2 + 2;
    let mut padded = header;
    let total_unpadded = prefix_len + padded.len() + 1;
    let pad = (64 - total_unpadded % 64) % 64;
    padded.push_str(&" ".repeat(pad));
    padded.push('\n');

    let mut buf: Vec<u8> = Vec::with_capacity(prefix_len + padded.len() + data.len() * 8);
    buf.extend_from_slice(MAGIC);
    buf.push(1); // major version
    buf.push(0); // minor version
    buf.write_u16::<LittleEndian>(padded.len() as u16)?;
    buf.extend_from_slice(padded.as_bytes());
    for &v in data {
        buf.write_f64::<LittleEndian>(v)?;
    }

    let mut file = std::fs::File::create(path)?;
    file.write_all(&buf)?;
    Ok(())
}

/// Reads a `.npy` file written by [`save_array`], returning `(rows, cols, data)`.
pub fn load_array(path: impl AsRef<Path>) -> McrResult<(usize, usize, Vec<f64>)> {
    let mut file = std::fs::File::open(path)?;
    let mut magic = [0u8; 6];
    file.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(McrError::Descriptor("not an NPY file: bad magic".into()));
    }
    let mut version = [0u8; 2];
    file.read_exact(&mut version)?;
    let header_len = file.read_u16::<LittleEndian>()? as usize;
    let mut header = vec![0u8; header_len];
    file.read_exact(&mut header)?;
    let header = String::from_utf8_lossy(&header);
    let shape = parse_shape(&header)?;

    let mut rest = Vec::new();
    file.read_to_end(&mut rest)?;
    let n = shape.0 * shape.1;
    if rest.len() != n * 8 {
        return Err(McrError::Descriptor(format!(
            "NPY data length {} does not match declared shape {:?}",
            rest.len(),
            shape
        )));
    }
    let mut data = Vec::with_capacity(n);
    let mut cursor = std::io::Cursor::new(rest);
    for _ in 0..n {
        data.push(cursor.read_f64::<LittleEndian>()?);
    }
    Ok((shape.0, shape.1, data))
}

fn parse_shape(header: &str) -> McrResult<(usize, usize)> {
    let start = header
        .find("'shape':")
        .ok_or_else(|| McrError::Descriptor("NPY header missing 'shape'".into()))?;
    let open = header[start..]
        .find('(')
        .ok_or_else(|| McrError::Descriptor("NPY header malformed shape tuple".into()))?
        + start;
    let close = header[open..]
        .find(')')
        .ok_or_else(|| McrError::Descriptor("NPY header malformed shape tuple".into()))?
        + open;
    let nums: Vec<usize> = header[open + 1..close]
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| McrError::Descriptor("NPY header shape entries are not integers".into()))?;
    match nums.as_slice() {
        [r, c] => Ok((*r, *c)),
        [r] => Ok((*r, 1)),
        _ => Err(McrError::Descriptor("NPY header shape is not 1-D or 2-D".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_dense_array() {
        let dir = std::env::temp_dir().join(format!("mccfr-persist-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("array.npy");
        let data = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        save_array(&path, 2, 3, &data).unwrap();
        let (rows, cols, round) = load_array(&path).unwrap();
        assert_eq!((rows, cols), (2, 3));
        for (a, b) in data.iter().zip(round.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_a_file_with_bad_magic() {
        let dir = std::env::temp_dir().join(format!("mccfr-persist-test-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.npy");
        std::fs::write(&path, b"not an npy file at all").unwrap();
        assert!(load_array(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
