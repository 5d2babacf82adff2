//! # Archivos estáticos
//! src/router/static_files.rs
//!
//! Sirve archivos bajo un directorio raíz para los recursos que empiezan
//! con un prefijo (ej: `/static/css/app.css` → `./static/css/app.css`).
//!
//! ## Contención
//!
//! El path pedido nunca puede salir del directorio raíz:
//!
//! 1. Se normaliza el path de forma léxica (`.` se ignora, `..` sube un
//!    nivel). Si queda fuera de la raíz → [`StaticFile::Escaped`], aunque
//!    el archivo no exista.
//! 2. Se canonicaliza (resuelve symlinks). Si no existe → [`StaticFile::NotFound`].
//! 3. Se vuelve a verificar la contención sobre el path canónico, para que
//!    un symlink dentro de la raíz no sirva archivos de afuera.
//!
//! La comparación es por componentes ([`Path::starts_with`]): `/srv/static2`
//! no está dentro de `/srv/static`.
//!
//! Si la raíz no existe al arrancar el montaje queda activo y responde
//! [`StaticFile::NotFound`] hasta que el directorio aparezca.

use std::env;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, ServerError};

/// Resultado de resolver un recurso estático
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticFile {
    /// El archivo existe dentro de la raíz
    Found { path: PathBuf, bytes: Vec<u8> },

    /// No existe, o no es un archivo regular
    NotFound,

    /// El path escapa de la raíz
    Escaped,
}

/// Un prefijo de recursos montado sobre un directorio
#[derive(Debug, Clone)]
pub struct StaticMount {
    prefix: String,

    /// Siempre canónico
    root: PathBuf,
}

impl StaticMount {
    /// Monta `dir` bajo `prefix`
    ///
    /// Si el directorio existe se canonicaliza aquí, una sola vez. Si no
    /// existe se monta igual (con su ruta absoluta) y cada request responde
    /// `NotFound` hasta que alguien lo cree. Un path que existe pero no es
    /// un directorio es un error de arranque.
    pub fn new(prefix: &str, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let root_error = |source: io::Error| ServerError::StaticRoot {
            path: dir.to_path_buf(),
            source,
        };

        let root = match fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => fs::canonicalize(dir).map_err(root_error)?,
            Ok(_) => {
                return Err(root_error(io::Error::new(
                    ErrorKind::InvalidInput,
                    "no es un directorio",
                )))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let root = absolute(dir).map_err(root_error)?;
                warn!("El directorio estático {:?} no existe; {} responderá 404", root, prefix);
                root
            }
            Err(e) => return Err(root_error(e)),
        };

        Ok(Self {
            prefix: prefix.to_string(),
            root,
        })
    }

    /// Raíz del montaje (canónica si existía al montar)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// ¿El recurso corresponde a este montaje?
    ///
    /// El prefijo tiene que terminar en un segmento: con `/static`,
    /// `/static/app.css` y `/static` corresponden, `/staticfoo` no.
    pub fn matches(&self, resource: &str) -> bool {
        match resource.strip_prefix(&self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }

    /// Resuelve un recurso que empieza con el prefijo
    pub fn resolve(&self, resource: &str) -> StaticFile {
        let relative = resource
            .strip_prefix(&self.prefix)
            .unwrap_or(resource)
            .trim_start_matches('/');

        let Some(candidate) = self.normalize(relative) else {
            debug!("{} escapa de {:?}", resource, self.root);
            return StaticFile::Escaped;
        };

        let root = match fs::canonicalize(&self.root) {
            Ok(root) => root,
            Err(e) => {
                debug!("Raíz {:?} no disponible: {}", self.root, e);
                return StaticFile::NotFound;
            }
        };

        let canonical = match fs::canonicalize(&candidate) {
            Ok(path) => path,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!("No se pudo resolver {:?}: {}", candidate, e);
                }
                return StaticFile::NotFound;
            }
        };

        if !canonical.starts_with(&root) {
            debug!("{:?} apunta fuera de {:?}", candidate, root);
            return StaticFile::Escaped;
        }

        if !canonical.is_file() {
            return StaticFile::NotFound;
        }

        match fs::read(&canonical) {
            Ok(bytes) => StaticFile::Found {
                path: canonical,
                bytes,
            },
            Err(e) => {
                debug!("No se pudo leer {:?}: {}", canonical, e);
                StaticFile::NotFound
            }
        }
    }

    /// Une `relative` a la raíz resolviendo `.` y `..` sin tocar el disco
    ///
    /// Retorna `None` si el resultado queda fuera de la raíz.
    fn normalize(&self, relative: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();

        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    path.pop();
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        path.starts_with(&self.root).then_some(path)
    }
}

/// `dir` como ruta absoluta, resolviendo `.` y `..` sin tocar el disco
fn absolute(dir: &Path) -> io::Result<PathBuf> {
    let joined = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        env::current_dir()?.join(dir)
    };

    let mut path = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                path.pop();
            }
            other => path.push(other),
        }
    }

    Ok(path)
}

/// Adivina el `Content-Type` por la extensión
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("htm") | Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
