//! Binary persistence of factor matrices, verified by reading each file back.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use nalgebra::DMatrix;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::nmf::NmfFactors;
use crate::svd::SvdFactors;

/// Serialize `value` to `path` and confirm the file decodes to an equal value.
///
/// A mismatch is fatal: the file is left on disk for inspection and
/// [`Error::ArtifactMismatch`] is returned.
pub fn write_verified<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let mut out = BufWriter::new(File::create(path)?);
    serde_cbor::to_writer(&mut out, value)?;
    out.flush()?;
    drop(out);

    let reloaded: T = read(path)?;
    if &reloaded != value {
        return Err(Error::ArtifactMismatch {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_cbor::from_reader(reader)?)
}

pub fn read_matrix(path: &Path) -> Result<DMatrix<f64>> {
    read(path)
}

/// `NMF_{k}k_W.cbor` and `NMF_{k}k_H.cbor` under `dir`.
pub fn write_nmf(dir: &Path, k: usize, factors: &NmfFactors) -> Result<[PathBuf; 2]> {
    let w = dir.join(format!("NMF_{k}k_W.cbor"));
    let h = dir.join(format!("NMF_{k}k_H.cbor"));
    write_verified(&w, &factors.w)?;
    write_verified(&h, &factors.h)?;
    info!("wrote {} and {}", w.display(), h.display());
    Ok([w, h])
}

/// `SVD_{k}k_U.cbor`, `SVD_{k}k_S.cbor` and `SVD_{k}k_VT.cbor` under `dir`.
pub fn write_svd(dir: &Path, k: usize, factors: &SvdFactors) -> Result<[PathBuf; 3]> {
    let u = dir.join(format!("SVD_{k}k_U.cbor"));
    let s = dir.join(format!("SVD_{k}k_S.cbor"));
    let v_t = dir.join(format!("SVD_{k}k_VT.cbor"));
    write_verified(&u, &factors.u)?;
    write_verified(&s, &factors.sigma)?;
    write_verified(&v_t, &factors.v_t)?;
    info!("wrote SVD factors for k={} to {}", k, dir.display());
    Ok([u, s, v_t])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;
    use tempfile::tempdir;

    #[test]
    fn matrix_survives_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.cbor");
        let m = DMatrix::from_row_slice(2, 3, &[0.1, 0.2, 0.3, 1e-300, -4.5, 6.0]);
        write_verified(&path, &m).unwrap();
        assert_eq!(read_matrix(&path).unwrap(), m);
    }

    #[test]
    fn nan_fails_verification() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nan.cbor");
        let m = DMatrix::from_element(1, 1, f64::NAN);
        assert!(matches!(
            write_verified(&path, &m),
            Err(Error::ArtifactMismatch { .. })
        ));
    }

    #[test]
    fn svd_names_by_rank_and_role() {
        let dir = tempdir().unwrap();
        let f = SvdFactors {
            u: DMatrix::identity(2, 2),
            sigma: DVector::from_vec(vec![2.0, 1.0]),
            v_t: DMatrix::identity(2, 2),
        };
        let paths = write_svd(dir.path(), 2, &f).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["SVD_2k_U.cbor", "SVD_2k_S.cbor", "SVD_2k_VT.cbor"]);
        let sigma: DVector<f64> = read(&paths[1]).unwrap();
        assert_eq!(sigma, f.sigma);
    }
}
