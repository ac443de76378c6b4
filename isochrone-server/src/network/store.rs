//! On-disk JSON form of the network.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use super::Network;
use super::error::NetworkError;

impl Network {
    /// Load a network previously written by [`Network::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| NetworkError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let network: Network =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| NetworkError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            stations = network.station_count(),
            edges = network.edge_count(),
            "Loaded network"
        );
        Ok(network)
    }

    /// Write the network as a JSON document.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), NetworkError> {
        let path = path.as_ref();
        let io_err = |source| NetworkError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
        serde_json::to_writer(&mut writer, self).map_err(|source| NetworkError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)?;

        info!(path = %path.display(), "Saved network");
        Ok(())
    }
}
