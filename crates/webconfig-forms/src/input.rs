//! Input variants and their bindings to live application values.
//!
//! An [`Input`] describes one form control before it is registered: the
//! form it belongs to, its label, its [`InputKind`], and a pair of closures
//! that read and write the bound value in its wire (string) form. Typed
//! constructors such as [`Input::boolean`] or [`Input::slider_int`] wrap
//! typed host closures with the string conversion for that variant.
//!
//! Registering an input with the [`Registry`](crate::Registry) assigns it an
//! [`InputId`] and turns it into an [`InputBinding`], which can render itself
//! as a table row and apply submitted values.
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use webconfig_forms::Input;
//!
//! let volume = Rc::new(Cell::new(11_i64));
//! let (get, set) = (volume.clone(), volume.clone());
//! let input = Input::slider_int("audio/Volume", move || get.get(), move |v| set.set(v))
//!     .unwrap()
//!     .range(0.0, 11.0, 0);
//! assert_eq!(input.form_name(), "audio");
//! assert_eq!(input.label(), "Volume");
//! assert_eq!(input.value(), "11");
//! ```

use std::fmt;

use webconfig_core::html::{Attrs, HtmlBuilder};
use webconfig_core::{WebConfigError, WebConfigResult};

use crate::form::FormSettings;

/// Style applied to every visible control.
const CONTROL_STYLE: &str = "width: 300px";

/// Client-side handler that submits the enclosing form.
const SUBMIT_SCRIPT: &str = "this.form.submit();";

/// Wire value for `true`.
pub const TRUE_VALUE: &str = "True";

/// Wire value for `false`.
pub const FALSE_VALUE: &str = "False";

/// Reads the bound value in its wire form.
pub type Getter = Box<dyn Fn() -> String>;

/// Writes a submitted wire value; returns a message when it does not parse.
pub type Setter = Box<dyn FnMut(&str) -> Result<(), String>>;

/// A process-unique input identifier, rendered as `input{n}`.
///
/// Identifiers are assigned in registration order starting at `input1` and
/// double as the `name` of the submitted form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InputId(u64);

impl InputId {
    /// Creates an identifier from its sequence number.
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Returns the sequence number.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parses a submitted field name such as `input3`. Only the canonical
    /// spelling is accepted: no sign, no leading zeros.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("input")?;
        if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u64>().ok().map(Self)
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input{}", self.0)
    }
}

/// Range and display format of a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    /// Lowest selectable value.
    pub min: f64,
    /// Highest selectable value.
    pub max: f64,
    /// Decimal places shown in the readout.
    pub decimals: usize,
    /// Number of discrete slider positions.
    pub value_count: u32,
}

impl Default for SliderRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            decimals: 0,
            value_count: 101,
        }
    }
}

impl SliderRange {
    /// Creates a range with the default 101 positions.
    pub fn new(min: f64, max: f64, decimals: usize) -> Self {
        Self {
            min,
            max,
            decimals,
            ..Self::default()
        }
    }

    /// Clamps `value` into `[min, max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Horizontal offset of the slider knob, in pixels over a 100px track.
    #[allow(clippy::cast_possible_truncation)]
    pub fn offset_px(&self, value: f64) -> i64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0;
        }
        ((self.clamp(value) - self.min) * 100.0 / span) as i64
    }

    /// Formats `value` with the configured number of decimals.
    pub fn format(&self, value: f64) -> String {
        format!("{value:.*}", self.decimals)
    }
}

/// The seven input variants with their variant-specific state.
#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    /// A free text box.
    Text,
    /// A push button that submits the form and calls the host.
    Button,
    /// A button that navigates to `url`.
    Link {
        /// Navigation target.
        url: String,
    },
    /// A pair of radio buttons.
    Boolean {
        /// Label of the `True` choice.
        true_label: String,
        /// Label of the `False` choice.
        false_label: String,
    },
    /// A drop-down list; the value is the zero-based option position.
    Select {
        /// Option labels in display order.
        options: Vec<String>,
    },
    /// An integer slider.
    SliderInt(SliderRange),
    /// A floating point slider.
    SliderFloat(SliderRange),
}

impl InputKind {
    /// A short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Button => "button",
            Self::Link { .. } => "link",
            Self::Boolean { .. } => "boolean",
            Self::Select { .. } => "select",
            Self::SliderInt(_) => "slider-int",
            Self::SliderFloat(_) => "slider-float",
        }
    }

    /// Returns `false` for buttons and links, whose values are never saved.
    pub const fn is_persistent(&self) -> bool {
        !matches!(self, Self::Button | Self::Link { .. })
    }

    fn default_boolean() -> Self {
        Self::Boolean {
            true_label: "Yes".to_string(),
            false_label: "No".to_string(),
        }
    }

    fn default_select() -> Self {
        Self::Select {
            options: vec!["Disabled".to_string(), "Enabled".to_string()],
        }
    }
}

/// An unregistered form input.
pub struct Input {
    form: String,
    label: String,
    kind: InputKind,
    getter: Option<Getter>,
    setter: Option<Setter>,
    read_only: bool,
    disabled: bool,
    title: Option<String>,
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("form", &self.form)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("writable", &self.setter.is_some())
            .field("read_only", &self.read_only)
            .field("disabled", &self.disabled)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl Input {
    fn from_path(
        path: &str,
        kind: InputKind,
        getter: Option<Getter>,
        setter: Option<Setter>,
    ) -> WebConfigResult<Self> {
        let (form, label) = split_path(path)?;
        Ok(Self {
            form: form.to_string(),
            label: label.to_string(),
            kind,
            getter,
            setter,
            read_only: false,
            disabled: false,
            title: None,
        })
    }

    /// A text box bound to a string value.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::InvalidInputPath`] unless `path` has the
    /// form `form-name/label`.
    pub fn text(
        path: &str,
        get: impl Fn() -> String + 'static,
        mut set: impl FnMut(&str) + 'static,
    ) -> WebConfigResult<Self> {
        Self::from_path(
            path,
            InputKind::Text,
            Some(Box::new(get)),
            Some(Box::new(move |value: &str| {
                set(value);
                Ok(())
            })),
        )
    }

    /// A pair of radio buttons bound to a boolean. Labels default to
    /// `Yes`/`No`.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::InvalidInputPath`] for a malformed path.
    pub fn boolean(
        path: &str,
        get: impl Fn() -> bool + 'static,
        mut set: impl FnMut(bool) + 'static,
    ) -> WebConfigResult<Self> {
        Self::from_path(
            path,
            InputKind::default_boolean(),
            Some(Box::new(move || bool_to_wire(get()).to_string())),
            Some(Box::new(move |value: &str| {
                set(parse_bool(value)?);
                Ok(())
            })),
        )
    }

    /// A drop-down bound to the index of the selected option. Options
    /// default to `Disabled`/`Enabled`.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::InvalidInputPath`] for a malformed path.
    pub fn select(
        path: &str,
        get: impl Fn() -> usize + 'static,
        mut set: impl FnMut(usize) + 'static,
    ) -> WebConfigResult<Self> {
        Self::from_path(
            path,
            InputKind::default_select(),
            Some(Box::new(move || get().to_string())),
            Some(Box::new(move |value: &str| {
                let index = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("'{value}' is not an option index"))?;
                set(index);
                Ok(())
            })),
        )
    }

    /// An integer slider over `0..=100` by default.
    ///
    /// Submitted values with a fractional part are rounded.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::InvalidInputPath`] for a malformed path.
    pub fn slider_int(
        path: &str,
        get: impl Fn() -> i64 + 'static,
        mut set: impl FnMut(i64) + 'static,
    ) -> WebConfigResult<Self> {
        Self::from_path(
            path,
            InputKind::SliderInt(SliderRange::default()),
            Some(Box::new(move || get().to_string())),
            Some(Box::new(move |value: &str| {
                set(parse_int(value)?);
                Ok(())
            })),
        )
    }

    /// A floating point slider over `0..=100` by default.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::InvalidInputPath`] for a malformed path.
    pub fn slider_float(
        path: &str,
        get: impl Fn() -> f64 + 'static,
        mut set: impl FnMut(f64) + 'static,
    ) -> WebConfigResult<Self> {
        Self::from_path(
            path,
            InputKind::SliderFloat(SliderRange::default()),
            Some(Box::new(move || get().to_string())),
            Some(Box::new(move |value: &str| {
                set(parse_float(value)?);
                Ok(())
            })),
        )
    }

    /// A button labelled with the path's label. `press` runs whenever the
    /// button's field arrives in a submission.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::InvalidInputPath`] for a malformed path.
    pub fn button(path: &str, mut press: impl FnMut() + 'static) -> WebConfigResult<Self> {
        Self::from_path(
            path,
            InputKind::Button,
            None,
            Some(Box::new(move |_: &str| {
                press();
                Ok(())
            })),
        )
    }

    /// A button that navigates the browser to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::InvalidInputPath`] for a malformed path.
    pub fn link(path: &str, url: impl Into<String>) -> WebConfigResult<Self> {
        Self::from_path(path, InputKind::Link { url: url.into() }, None, None)
    }

    /// Marks the control read-only in the browser.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Marks the control disabled in the browser.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Sets the tooltip text.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the labels of a boolean's two choices. Ignored for other kinds.
    #[must_use]
    pub fn labels(mut self, true_label: impl Into<String>, false_label: impl Into<String>) -> Self {
        if let InputKind::Boolean { .. } = self.kind {
            self.kind = InputKind::Boolean {
                true_label: true_label.into(),
                false_label: false_label.into(),
            };
        }
        self
    }

    /// Sets a select's options. Ignored for other kinds.
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let InputKind::Select { .. } = self.kind {
            self.kind = InputKind::Select {
                options: options.into_iter().map(Into::into).collect(),
            };
        }
        self
    }

    /// Sets a slider's range and readout precision. Ignored for other kinds.
    #[must_use]
    pub fn range(mut self, min: f64, max: f64, decimals: usize) -> Self {
        if let InputKind::SliderInt(range) | InputKind::SliderFloat(range) = &mut self.kind {
            range.min = min;
            range.max = max;
            range.decimals = decimals;
        }
        self
    }

    /// Sets the number of discrete slider positions. Ignored for other kinds.
    #[must_use]
    pub fn value_count(mut self, value_count: u32) -> Self {
        if let InputKind::SliderInt(range) | InputKind::SliderFloat(range) = &mut self.kind {
            range.value_count = value_count;
        }
        self
    }

    /// The name of the owning form.
    pub fn form_name(&self) -> &str {
        &self.form
    }

    /// The display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The variant and its state.
    pub const fn kind(&self) -> &InputKind {
        &self.kind
    }

    /// The current value in wire form; empty for buttons and links.
    pub fn value(&self) -> String {
        self.getter.as_ref().map(|get| get()).unwrap_or_default()
    }

    fn extra_attrs(&self) -> Attrs {
        Attrs::new()
            .flag_if("readonly", self.read_only)
            .flag_if("disabled", self.disabled)
            .with_opt("title", self.title.as_deref())
    }
}

/// A registered input.
#[derive(Debug)]
pub struct InputBinding {
    id: InputId,
    input: Input,
}

impl InputBinding {
    pub(crate) const fn new(id: InputId, input: Input) -> Self {
        Self { id, input }
    }

    /// The assigned identifier.
    pub const fn id(&self) -> InputId {
        self.id
    }

    /// The name of the owning form.
    pub fn form_name(&self) -> &str {
        self.input.form_name()
    }

    /// The display label.
    pub fn label(&self) -> &str {
        self.input.label()
    }

    /// The variant and its state.
    pub const fn kind(&self) -> &InputKind {
        self.input.kind()
    }

    /// The current value in wire form.
    pub fn value(&self) -> String {
        self.input.value()
    }

    /// Returns `true` if the value belongs in a saved snapshot.
    pub const fn is_persistent(&self) -> bool {
        self.input.kind.is_persistent()
    }

    /// Passes a submitted value to the setter.
    ///
    /// # Errors
    ///
    /// Returns [`WebConfigError::Binding`] if the input has no setter, the
    /// value does not parse, or a select index is out of range. The bound
    /// value is left unchanged.
    pub fn apply(&mut self, value: &str) -> WebConfigResult<()> {
        let id = self.id;
        if let InputKind::Select { options } = &self.input.kind {
            if let Ok(index) = value.trim().parse::<usize>() {
                if index >= options.len() {
                    return Err(WebConfigError::binding(
                        id.to_string(),
                        format!("option {index} out of range (0..{})", options.len()),
                    ));
                }
            }
        }
        let Some(setter) = self.input.setter.as_mut() else {
            return Err(WebConfigError::binding(id.to_string(), "input is not writable"));
        };
        setter(value).map_err(|message| WebConfigError::binding(id.to_string(), message))
    }

    /// Renders the input as one `tr` row of the form table.
    pub fn render(&self, form: &FormSettings, b: &mut HtmlBuilder) {
        let heading = match self.kind() {
            InputKind::Button | InputKind::Link { .. } => None,
            _ => Some(format!("{}:", self.label())),
        };
        b.element("tr", &Attrs::new(), |b| {
            b.element("th", &Attrs::new(), |b| {
                if let Some(heading) = &heading {
                    b.text(heading);
                }
            });
            b.element("td", &Attrs::new(), |b| self.render_control(form, b));
        });
    }

    fn render_control(&self, form: &FormSettings, b: &mut HtmlBuilder) {
        let name = self.id.to_string();
        let value = self.value();
        let extras = self.input.extra_attrs();

        match self.kind() {
            InputKind::Text => {
                b.void(
                    "input",
                    &Attrs::new()
                        .with("type", "text")
                        .with("name", &name)
                        .with("value", &value)
                        .with("style", CONTROL_STYLE)
                        .extend(&extras),
                );
            }
            InputKind::Button => {
                b.void("input", &Attrs::new().with("type", "hidden").with("name", &name));
                b.void(
                    "input",
                    &Attrs::new()
                        .with("type", "button")
                        .with("value", self.label())
                        .with("style", CONTROL_STYLE)
                        .extend(&extras)
                        .with("onclick", format!("doclick(this.form.{name});")),
                );
            }
            InputKind::Link { url } => {
                b.void(
                    "input",
                    &Attrs::new()
                        .with("type", "button")
                        .with("value", self.label())
                        .with("style", CONTROL_STYLE)
                        .extend(&extras)
                        .with("onclick", format!("document.location.href = \"{url}\";")),
                );
            }
            InputKind::Boolean {
                true_label,
                false_label,
            } => {
                let mut radio = extras.with("type", "radio").with("name", &name);
                if form.auto_submit {
                    radio = radio.with("onclick", SUBMIT_SCRIPT);
                }
                let is_true = !value.trim().eq_ignore_ascii_case("false");
                b.void(
                    "input",
                    &radio
                        .clone()
                        .with("value", TRUE_VALUE)
                        .flag_if("checked", is_true),
                );
                b.text(true_label);
                b.void(
                    "input",
                    &radio.with("value", FALSE_VALUE).flag_if("checked", !is_true),
                );
                b.text(false_label);
            }
            InputKind::Select { options } => {
                let mut attrs = Attrs::new()
                    .with("name", &name)
                    .with("style", CONTROL_STYLE)
                    .extend(&extras);
                if form.auto_submit {
                    attrs = attrs.with("onchange", SUBMIT_SCRIPT);
                }
                let selected = value.trim();
                b.element("select", &attrs, |b| {
                    for (index, option) in options.iter().enumerate() {
                        let position = index.to_string();
                        let attrs = Attrs::new()
                            .with("value", &position)
                            .flag_if("selected", selected == position);
                        b.element("option", &attrs, |b| {
                            b.text(option);
                        });
                    }
                });
            }
            InputKind::SliderInt(range) | InputKind::SliderFloat(range) => {
                render_slider(range, form, &name, &value, &extras, b);
            }
        }
    }
}

fn render_slider(
    range: &SliderRange,
    form: &FormSettings,
    name: &str,
    value: &str,
    extras: &Attrs,
    b: &mut HtmlBuilder,
) {
    let current = range.clamp(value.trim().parse::<f64>().unwrap_or(range.min));
    let display_id = format!("{name}_display");
    let class = |class_name: &str| Attrs::new().with("class", class_name);

    b.element("div", &class("carpe_horizontal_slider_display_combo"), |b| {
        b.element("div", &class("carpe_horizontal_slider_track"), |b| {
            b.element("div", &class("carpe_slider_slit"), |b| {
                b.nbsp();
            });
            let knob = class("carpe_slider")
                .with("id", name)
                .with("display", &display_id)
                .with("style", format!("left: {}px;", range.offset_px(current)));
            b.element("div", &knob, |b| {
                b.nbsp();
            });
        });
        b.element("div", &class("carpe_slider_display_holder"), |b| {
            let mut readout = class("carpe_slider_display")
                .with("name", name)
                .with("id", &display_id)
                .with("type", "text")
                .with("from", range.min.to_string())
                .with("to", range.max.to_string())
                .with("value", range.format(current))
                .with("valuecount", range.value_count.to_string())
                .with("decimals", range.decimals.to_string())
                .with("typelock", "off")
                .extend(extras);
            if form.auto_submit {
                readout = readout.with("onchange", SUBMIT_SCRIPT);
            }
            b.void("input", &readout);
        });
    });
}

/// Splits `form-name/label`. Exactly one `/` with text on both sides.
fn split_path(path: &str) -> WebConfigResult<(&str, &str)> {
    match path.split_once('/') {
        Some((form, label)) if !form.is_empty() && !label.is_empty() && !label.contains('/') => {
            Ok((form, label))
        }
        _ => Err(WebConfigError::InvalidInputPath(path.to_string())),
    }
}

const fn bool_to_wire(value: bool) -> &'static str {
    if value {
        TRUE_VALUE
    } else {
        FALSE_VALUE
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("'{value}' is not True or False"))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_int(value: &str) -> Result<i64, String> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Ok(n);
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < 9.0e15 => Ok(f.round() as i64),
        _ => Err(format!("'{value}' is not an integer")),
    }
}

fn parse_float(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err(format!("'{value}' is not a number")),
    }
}
