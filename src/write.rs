use gtmpl::{Template, Value};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// The built-in listing template, used when no template file is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("../theme/index.html");

/// Responsible for templating the listing page and writing it out.
pub struct Writer<'a> {
    /// The template for the listing page. The root value is the one produced
    /// by `Value::from(&PageListController)`.
    pub template: &'a Template,
}

impl Writer<'_> {
    /// Templates `page` into `w`.
    pub fn write<W: io::Write>(&self, page: Value, w: &mut W) -> Result<()> {
        self.template.execute(w, &gtmpl::Context::from(page)?)?;
        Ok(())
    }

    /// Templates `page` into the file at `path`, creating parent directories
    /// as needed and replacing any existing file.
    pub fn write_file(&self, page: Value, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let mut file = File::create(path).map_err(|err| Error::Create {
            path: path.to_owned(),
            err,
        })?;
        self.write(page, &mut file)
    }

    /// Templates `page` into a string.
    pub fn render(&self, page: Value) -> Result<String> {
        let mut out: Vec<u8> = Vec::new();
        self.write(page, &mut out)?;
        String::from_utf8(out).map_err(|err| Error::Template(err.to_string()))
    }
}

/// Loads the template at `path`, or the built-in template if `path` is
/// `None`.
pub fn load_template(path: Option<&Path>) -> Result<Template> {
    let contents = match path {
        None => String::from(DEFAULT_TEMPLATE),
        Some(path) => std::fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?,
    };

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// An error during templating.
    Template(String),

    /// Returned when the output file can't be created.
    Create { path: PathBuf, err: io::Error },

    /// An error writing the output.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::Template(err) => err.fmt(f),
            Error::Create { path, err } => {
                write!(f, "Creating output file '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
            Error::Create { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
