#[cfg(test)]
mod tests;

use {
    crate::utils::errorfmt::ErrorFmt,
    ahash::AHashMap,
    linearize::{Linearize, LinearizeExt},
    std::time::Duration,
    thiserror::Error,
};

pub const DEFAULT_LOAD_DETECT_WAIT: Duration = Duration::from_micros(16);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown option `{0}`")]
    UnknownOption(String),
    #[error("`{0}` is not a boolean")]
    NotABool(String),
    #[error("Could not parse the duration `{0}`")]
    Duration(String, #[source] humantime::DurationError),
    #[error("Option `{0}`")]
    Option(&'static str, #[source] Box<ConfigError>),
    #[error("`{0}` applies to the whole device and cannot be set for output {1}")]
    DeviceScoped(&'static str, String),
}

/// Per-output panel options.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OutputOptions {
    /// Center smaller modes on the panel instead of scaling them up.
    pub center: bool,
    /// Allow modes other than the panel's native mode.
    pub scaling: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            center: false,
            scaling: true,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeviceOptions {
    /// How long the manual VGA probe waits after powering the DAC.
    pub load_detect_wait: Duration,
    pub olpc_xo15: bool,
    pub nano_book: bool,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            load_detect_wait: DEFAULT_LOAD_DETECT_WAIT,
            olpc_xo15: false,
            nano_book: false,
        }
    }
}

/// Entries given as `<output>:<name>`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
struct OutputOverrides {
    center: Option<bool>,
    scaling: Option<bool>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Options {
    pub device: DeviceOptions,
    /// Applies to every output without its own entry.
    pub output: OutputOptions,
    per_output: AHashMap<String, OutputOverrides>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Linearize)]
enum Key {
    Center,
    Scaling,
    LoadDetectWait,
    OlpcXo15,
    NanoBook,
}

impl Key {
    fn name(self) -> &'static str {
        match self {
            Key::Center => "Center",
            Key::Scaling => "Scaling",
            Key::LoadDetectWait => "LoadDetectWait",
            Key::OlpcXo15 => "OLPCXO15",
            Key::NanoBook => "NanoBook",
        }
    }

    fn find(name: &str) -> Option<Self> {
        let name = normalize(name);
        Key::variants().find(|k| normalize(k.name()) == name)
    }
}

/// Option names compare case-insensitively and ignore `_`, `-` and
/// whitespace.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn parse_bool(s: &str) -> Result<bool, ConfigError> {
    match normalize(s).as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::NotABool(s.to_string())),
    }
}

pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(s.trim()).map_err(|e| ConfigError::Duration(s.to_string(), e))
}

impl Options {
    fn apply(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let (output, name) = match name.split_once(':') {
            Some((output, name)) => (Some(output.trim()), name),
            None => (None, name),
        };
        let Some(key) = Key::find(name) else {
            return Err(ConfigError::UnknownOption(name.to_string()));
        };
        let wrap = |e| ConfigError::Option(key.name(), Box::new(e));
        if let Some(output) = output {
            let overrides = self
                .per_output
                .entry(output.to_ascii_uppercase())
                .or_default();
            match key {
                Key::Center => overrides.center = Some(parse_bool(value).map_err(wrap)?),
                Key::Scaling => overrides.scaling = Some(parse_bool(value).map_err(wrap)?),
                _ => return Err(ConfigError::DeviceScoped(key.name(), output.to_string())),
            }
            return Ok(());
        }
        match key {
            Key::Center => self.output.center = parse_bool(value).map_err(wrap)?,
            Key::Scaling => self.output.scaling = parse_bool(value).map_err(wrap)?,
            Key::LoadDetectWait => {
                self.device.load_detect_wait = parse_duration(value).map_err(wrap)?
            }
            Key::OlpcXo15 => self.device.olpc_xo15 = parse_bool(value).map_err(wrap)?,
            Key::NanoBook => self.device.nano_book = parse_bool(value).map_err(wrap)?,
        }
        Ok(())
    }

    /// Builds options from host-supplied `(name, value)` pairs. Unknown
    /// names and malformed values are logged and skipped.
    ///
    /// Panel options can be scoped to one output by prefixing the output
    /// name, as in `FP-2:Center`.
    pub fn parse<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut res = Self::default();
        for (name, value) in pairs {
            if let Err(e) = res.apply(name, value) {
                log::warn!("Ignoring option: {}", ErrorFmt(e));
            }
        }
        res
    }

    /// The options of the output called `name`.
    pub fn output_options(&self, name: &str) -> OutputOptions {
        let mut res = self.output;
        if let Some(o) = self.per_output.get(&name.to_ascii_uppercase()) {
            res.center = o.center.unwrap_or(res.center);
            res.scaling = o.scaling.unwrap_or(res.scaling);
        }
        res
    }
}
