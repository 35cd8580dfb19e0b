//! DOM scripts injected by the fallback strategies.
//!
//! Every dynamic value reaches a script through `arguments`, so city names and
//! dates never end up spliced into script text. Scripts used as query
//! strategies receive the query scope (an element or `null`) as `arguments[0]`.

use serde_json::{json, Value};

/// Inputs that look like the travel-date field. Shared by the scripts below.
const DATE_INPUT_PREDICATE: &str = r#"
function looksLikeDateInput(input, index) {
  var placeholder = input.placeholder || '';
  var className = typeof input.className === 'string' ? input.className : '';
  return placeholder.indexOf('/') > -1
    || className.indexOf('datepicker') > -1
    || input.getAttribute('data-provide') === 'datepicker'
    || input.type === 'date'
    || placeholder.indexOf('Tarih') > -1
    || index === 2;
}
"#;

/// Lowercase and strip Turkish diacritics, matching `city_matches` on the Rust side.
const FOLD_FUNCTION: &str = r#"
function fold(text) {
  var map = { 'ş': 's', 'ğ': 'g', 'ı': 'i', 'ö': 'o', 'ü': 'u', 'ç': 'c' };
  return String(text).trim().toLowerCase()
    .replace(/\u0307/g, '')
    .replace(/[şğıöüç]/g, function (c) { return map[c]; });
}
"#;

/// Query: the input next to a calendar icon, or the icon itself.
pub const CALENDAR_ICON_INPUT: &str = r#"
var root = arguments[0] || document;
var icons = root.querySelectorAll('i.fa-calendar, i.fa-calendar-alt, span.calendar-icon');
if (icons.length === 0) { return null; }
var icon = icons[0];
var parent = icon.parentElement;
if (!parent) { return icon; }
if (parent.tagName === 'INPUT') { return parent; }
return parent.querySelector('input') || icon;
"#;

/// Query: the first input whose placeholder looks like a `dd/MM/yyyy` date.
pub const SLASH_PLACEHOLDER_INPUT: &str = r#"
var root = arguments[0] || document;
var inputs = root.getElementsByTagName('input');
for (var i = 0; i < inputs.length; i++) {
  if (inputs[i].placeholder && inputs[i].placeholder.indexOf('/') > -1) {
    return inputs[i];
  }
}
return null;
"#;

/// Query: a visible day cell of the current month whose text equals `arguments[1]`.
pub const CURRENT_MONTH_DAY_CELL: &str = r#"
var root = arguments[0] || document;
var wanted = String(arguments[1]);
var cells = root.querySelectorAll('.datepicker-days td.day, .datepicker td.day, td.day');
for (var i = 0; i < cells.length; i++) {
  var cell = cells[i];
  if (cell.classList.contains('old') || cell.classList.contains('new')
      || cell.classList.contains('disabled')) {
    continue;
  }
  if (cell.textContent.trim() === wanted) {
    return cell;
  }
}
return null;
"#;

/// Query: the first `.select2-results__option` whose text contains `arguments[1]`.
pub fn select2_option() -> String {
    format!(
        r#"{}
var root = arguments[0] || document;
var wanted = fold(arguments[1]);
var options = root.querySelectorAll('.select2-results__option');
for (var i = 0; i < options.length; i++) {{
  if (fold(options[i].textContent).indexOf(wanted) > -1) {{
    return options[i];
  }}
}}
return null;
"#,
        FOLD_FUNCTION
    )
}

/// Query: the first button whose text contains `arguments[1]`.
pub const BUTTON_WITH_LABEL: &str = r#"
var root = arguments[0] || document;
var wanted = String(arguments[1]);
var buttons = root.querySelectorAll('button, input[type="submit"], a.btn');
for (var i = 0; i < buttons.length; i++) {
  var label = buttons[i].textContent || buttons[i].value || '';
  if (label.indexOf(wanted) > -1) {
    return buttons[i];
  }
}
return null;
"#;

/// Query: the first submit-like button on the page.
pub const SUBMIT_LIKE_BUTTON: &str = r#"
var root = arguments[0] || document;
return root.querySelector(
  'button[type="submit"], input[type="submit"], button.btn-primary, button.search-button'
);
"#;

/// Action: set the travel-date input to `arguments[0]` and fire `change`.
/// Returns true when an input was written.
pub fn set_date_value() -> String {
    format!(
        r#"{}
var value = arguments[0];
var inputs = document.querySelectorAll('input');
for (var i = 0; i < inputs.length; i++) {{
  if (looksLikeDateInput(inputs[i], i)) {{
    inputs[i].value = value;
    inputs[i].dispatchEvent(new Event('input', {{ bubbles: true }}));
    inputs[i].dispatchEvent(new Event('change', {{ bubbles: true }}));
    if (window.jQuery && window.jQuery(inputs[i]).datepicker) {{
      try {{ window.jQuery(inputs[i]).datepicker('update', value); }} catch (e) {{}}
    }}
    return true;
  }}
}}
return false;
"#,
        DATE_INPUT_PREDICATE
    )
}

/// Action: read the current value of the travel-date input, or null.
pub fn read_date_value() -> String {
    format!(
        r#"{}
var inputs = document.querySelectorAll('input');
for (var i = 0; i < inputs.length; i++) {{
  if (looksLikeDateInput(inputs[i], i)) {{
    return inputs[i].value;
  }}
}}
return null;
"#,
        DATE_INPUT_PREDICATE
    )
}

/// Action: pick the option containing `arguments[1]` on the native `<select>`
/// identified by `arguments[0]` (id or name) and fire `change`.
/// Returns true when an option was selected.
pub fn select_native_option() -> String {
    format!(
        r#"{}
var key = arguments[0];
var wanted = fold(arguments[1]);
var select = document.getElementById(key) || document.querySelector('select[name="' + key + '"]');
if (!select || !select.options || wanted.length === 0) {{ return false; }}
for (var j = 0; j < select.options.length; j++) {{
  if (fold(select.options[j].text).indexOf(wanted) > -1) {{
    select.selectedIndex = j;
    select.options[j].selected = true;
    select.dispatchEvent(new Event('change', {{ bubbles: true }}));
    if (window.jQuery) {{
      try {{ window.jQuery(select).trigger('change'); }} catch (e) {{}}
    }}
    return true;
  }}
}}
return false;
"#,
        FOLD_FUNCTION
    )
}

/// Action: the text currently shown for the city widget keyed by `arguments[0]`,
/// or null when nothing can be read back.
pub const SELECTED_CITY_TEXT: &str = r#"
var key = arguments[0];
var rendered = document.getElementById('select2-' + key + '-container');
if (rendered && rendered.textContent.trim().length > 0) {
  return rendered.getAttribute('title') || rendered.textContent.trim();
}
var select = document.getElementById(key) || document.querySelector('select[name="' + key + '"]');
if (select && select.selectedIndex > -1 && select.options[select.selectedIndex]) {
  var text = select.options[select.selectedIndex].text.trim();
  return text.length > 0 ? text : null;
}
return null;
"#;

/// Arguments for a script query: the scope followed by extra arguments.
pub fn query_args(scope: Option<Value>, extra: &[Value]) -> Vec<Value> {
    let mut args = Vec::with_capacity(extra.len() + 1);
    args.push(scope.unwrap_or(Value::Null));
    args.extend(extra.iter().cloned());
    args
}

/// Arguments for the day-cell script.
pub fn day_args(day: u32) -> Vec<Value> {
    vec![json!(day.to_string())]
}
