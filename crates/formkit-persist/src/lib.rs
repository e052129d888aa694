//! Persistence codec for visual-builder forms.
//!
//! Reads and writes the XML form format into a [`formkit_core::FormModel`].
//! Older documents are upgraded on load: legacy layout descriptions are
//! converted to layout code, and the version negotiator decides which
//! format version a save writes.
//!
//! # Modules
//!
//! - [`document`]: XML element tree over quick-xml
//! - [`values`]: typed attribute values and design-reference elements
//! - [`codec`]: expression/statement graph encoder and decoder
//! - [`legacy`]: legacy layout and constraints conversion
//! - [`connected`]: deferred connected-property resolution
//! - [`load`] and [`save`]: whole-document load and save
//! - [`config`]: load/save options and the JSON configuration file

pub mod codec;
pub mod config;
pub mod connected;
pub mod document;
pub mod error;
pub mod forminfo;
pub mod identity;
pub mod legacy;
pub mod load;
pub mod names;
pub mod order;
pub mod pass;
pub mod save;
pub mod values;

use std::io::Write;
use std::path::Path;

use tracing::info;

use formkit_core::{FormModel, SymbolResolver};

pub use codec::{DecodeError, Decoder, Encoder};
pub use config::{LoadOptions, PersistConfig, SaveOptions};
pub use connected::{ConnectedProperties, ConnectedTarget};
pub use document::Element;
pub use error::{LoadPath, NonFatalError, PathSegment, PersistError};
pub use load::{can_load, load_form, LoadedForm};
pub use pass::{CodeMode, Pass};
pub use save::save_form;

/// Loads and saves forms against one symbol table.
pub struct FormPersistence<S: SymbolResolver> {
    symbols: S,
    load: LoadOptions,
    save: SaveOptions,
}

impl<S: SymbolResolver> FormPersistence<S> {
    pub fn new(symbols: S) -> Self {
        FormPersistence {
            symbols,
            load: LoadOptions::default(),
            save: SaveOptions::default(),
        }
    }

    pub fn with_options(mut self, load: LoadOptions, save: SaveOptions) -> Self {
        self.load = load;
        self.save = save;
        self
    }

    pub fn symbols(&self) -> &S {
        &self.symbols
    }

    pub fn can_load(&self, text: &str) -> bool {
        can_load(text)
    }

    pub fn load(&self, text: &str) -> Result<LoadedForm, PersistError> {
        load_form(text, &self.symbols, &self.load)
    }

    pub fn save(&self, form: &mut FormModel) -> Result<String, PersistError> {
        save_form(form, &self.symbols, &self.save)
    }

    /// Load a file; the form is named after the file stem unless the load
    /// options name it.
    pub fn load_file(&self, path: &Path) -> Result<LoadedForm, PersistError> {
        let text = std::fs::read_to_string(path)?;
        let mut options = self.load.clone();
        if options.form_name.is_none() {
            options.form_name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string);
        }
        load_form(&text, &self.symbols, &options)
    }

    /// Save to a file. The document is written to a temporary file next to
    /// `path` and moved into place, so a failed save leaves `path` intact.
    pub fn save_file(&self, form: &mut FormModel, path: &Path) -> Result<(), PersistError> {
        let text = self.save(form)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        file.persist(path).map_err(|err| err.error)?;
        info!(path = %path.display(), form = %form.name, "saved form");
        Ok(())
    }
}
