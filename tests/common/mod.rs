//! Shared helpers for the browser tests.
//!
//! The browser tests need a WebDriver server (`chromedriver --port=4444`) and
//! are marked `#[ignore]`; run them with `cargo test -- --ignored`. Except for
//! the live-site test they run against [`FixtureServer`], which serves replicas
//! of the booking page on a random port. Each replica breaks the widgets in a
//! different way so that a different fallback has to step in:
//!
//! | path          | cities                          | date                                      |
//! |---------------|---------------------------------|-------------------------------------------|
//! | `/`           | Select2 with search             | datepicker input, Turkish header          |
//! | `/alt`        | Kalkış/Varış autocomplete       | calendar icon, no `datepicker-days` block |
//! | `/table`      | Select2, results never "open"   | day cells without the `day` class         |
//! | `/positional` | none                            | only reachable as the third input, English header |
//! | `/frozen`     | none                            | prev/next never change the month          |
//! | `/bare`       | native selects                  | plain text input                          |

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use journey_query::prelude::*;
use thirtyfour::WebDriver;
use tokio::sync::oneshot;
use warp::Filter;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Short waits; the fixture pages are local and quick.
pub fn fixture_timing() -> Timing {
    Timing {
        poller: ElementPoller::TimeoutWithInterval(Duration::from_secs(5), Duration::from_millis(200)),
        optional: ElementPoller::TimeoutWithInterval(Duration::from_secs(1), Duration::from_millis(200)),
        settle: Duration::from_millis(100),
    }
}

pub async fn connect() -> JourneyResult<WebDriver> {
    init_logging();
    SuiteConfig::from_env()?.connect().await
}

/// Serves the booking-page replicas.
pub struct FixtureServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

fn html_route(
    name: &'static str,
    body: String,
) -> impl Filter<Extract = (warp::reply::Html<String>,), Error = warp::Rejection> + Clone {
    warp::path(name).and(warp::path::end()).map(move || warp::reply::html(body.clone()))
}

impl FixtureServer {
    pub async fn start() -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let home = home_page();
        let index = warp::path::end().map(move || warp::reply::html(home.clone()));
        let routes = index
            .or(html_route("alt", alt_page()))
            .or(html_route("table", table_page()))
            .or(html_route("positional", positional_page()))
            .or(html_route("frozen", frozen_page()))
            .or(html_route("bare", BARE_PAGE.to_string()))
            .or(html_route("sefer", RESULTS_PAGE.to_string()))
            .or(html_route("login", LOGIN_PAGE.to_string()));

        let (addr, server) =
            warp::serve(routes).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                shutdown_rx.await.ok();
            });
        tokio::spawn(server);

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL, e.g. "http://127.0.0.1:12345".
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Absolute URL of one of the replicas, e.g. `page("alt")`.
    pub fn page(&self, name: &str) -> String {
        format!("{}/{}", self.url(), name)
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn page(title: &str, body: &str, scripts: &[&str]) -> String {
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"tr\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n",
        title, STYLE, body
    );
    for script in scripts {
        html.push_str("<script>\n");
        html.push_str(script);
        html.push_str("\n</script>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Calendar pop-up. `attrs` configures [`CALENDAR_JS`]: `data-input` (id of the
/// date input), `data-labels` (`tr` or `en`), `data-frozen`, `data-cell` (class
/// of the day cells).
fn calendar(attrs: &str, days_block: bool) -> String {
    let table = r#"<table>
      <thead><tr><th class="prev">&laquo;</th><th class="datepicker-switch" colspan="5"></th><th class="next">&raquo;</th></tr></thead>
      <tbody></tbody>
    </table>"#;
    let inner = if days_block {
        format!("<div class=\"datepicker-days\">{}</div>", table)
    } else {
        table.to_string()
    };
    format!(
        "<div class=\"datepicker datepicker-dropdown hidden\" id=\"datepicker\" {}>{}</div>",
        attrs, inner
    )
}

/// Cookie popup, Select2 city pickers, datepicker opening on March 2025,
/// "Sorgula" button, login link and member greeting.
pub fn home_page() -> String {
    let body = format!(
        r#"{cookie}
<a href="/login" id="login-link">Giriş</a>
<div class="welcome-message hidden"></div>
<form id="search-form" action="/sefer" method="get">
  {cities}
  <span class="input-group">
    <input type="text" id="date" name="date" class="form-control datepicker"
           placeholder="09/03/2025" autocomplete="off" readonly>
    <i class="fa fa-calendar"></i>
  </span>
  <button type="submit" class="btn btn-primary">Sorgula</button>
</form>
{dropdown}
{calendar}"#,
        cookie = COOKIE_POPUP,
        cities = SELECT2_FIELDS,
        dropdown = SELECT2_DROPDOWN_OPEN,
        calendar = calendar(r#"data-input="date""#, true),
    );
    page(
        "Düzce Güven - Otobüs Bileti",
        &body,
        &[COOKIE_JS, WELCOME_JS, SELECT2_JS, CALENDAR_JS],
    )
}

/// Autocomplete city inputs and a date field found only through its calendar
/// icon. The calendar lacks the `datepicker-days` block.
pub fn alt_page() -> String {
    let body = format!(
        r#"<form action="/sefer" method="get">
  <input type="text" id="from" name="from" placeholder="Kalkış Noktası" autocomplete="off">
  <ul class="autocomplete hidden" id="from-list"></ul>
  <input type="text" id="to" name="to" placeholder="Varış Noktası" autocomplete="off">
  <ul class="autocomplete hidden" id="to-list"></ul>
  <span class="input-group">
    <input type="text" id="travel" name="travel" placeholder="Gidiş Tarihi" readonly>
    <i class="fa fa-calendar"></i>
  </span>
  <button type="submit">Sorgula</button>
</form>
{calendar}"#,
        calendar = calendar(r#"data-input="travel""#, false),
    );
    page("Sefer Ara", &body, &[AUTOCOMPLETE_JS, CALENDAR_JS])
}

/// Select2 whose result list never gets the `--open` class, and a calendar
/// whose cells carry no `day` class.
pub fn table_page() -> String {
    let body = format!(
        r#"<form action="/sefer" method="get">
  {cities}
  <input type="text" id="date" name="date" class="datepicker" placeholder="gg/aa/yyyy" readonly>
  <button type="submit">Sorgula</button>
</form>
{dropdown}
{calendar}"#,
        cities = SELECT2_FIELDS,
        dropdown = SELECT2_DROPDOWN_PLAIN,
        calendar = calendar(r#"data-input="date" data-cell="cell""#, true),
    );
    page("Sefer Ara", &body, &[SELECT2_JS, CALENDAR_JS])
}

/// The date input has no class, icon or slash placeholder, and the calendar
/// header is in English.
pub fn positional_page() -> String {
    let body = format!(
        r#"<form action="/sefer" method="get">
  <input type="text" id="from" name="from">
  <input type="text" id="to" name="to">
  <input type="text" id="when" name="when" placeholder="Gidiş Tarihi" readonly>
  <button type="submit">Sorgula</button>
</form>
{calendar}"#,
        calendar = calendar(r#"data-input="when" data-labels="en""#, true),
    );
    page("Sefer Ara", &body, &[CALENDAR_JS])
}

/// The calendar arrows redraw the same month.
pub fn frozen_page() -> String {
    let body = format!(
        r#"<form action="/sefer" method="get">
  <input type="text" id="date" name="date" class="datepicker" placeholder="gg/aa/yyyy" readonly>
  <button type="submit">Sorgula</button>
</form>
{calendar}"#,
        calendar = calendar(r#"data-input="date" data-frozen="true""#, true),
    );
    page("Sefer Ara", &body, &[CALENDAR_JS])
}

const STYLE: &str = r#"
  .hidden { display: none !important; }
  #cookie-popup { padding: 8px; background: #eee; }
  #select2-dropdown { position: absolute; left: 10px; width: 260px; background: #fff; border: 1px solid #aaa; }
  .select2-results__option, .autocomplete li { padding: 4px; cursor: pointer; }
  #datepicker { position: absolute; left: 10px; background: #fff; border: 1px solid #aaa; }
  #datepicker td { padding: 2px 6px; cursor: pointer; }
  td.old, td.new { color: #999; }
"#;

const COOKIE_POPUP: &str = r#"<div id="cookie-popup">
  <p>Sitemizde çerezler kullanılmaktadır.</p>
  <button type="button" id="cookie-accept">Kabul Et</button>
</div>"#;

const SELECT2_FIELDS: &str = r#"<select id="departure" name="departure" style="display:none">
    <option value=""></option>
    <option value="6700">ZONGULDAK</option>
    <option value="8100">DÜZCE</option>
    <option value="0600">ANKARA</option>
    <option value="3400">İSTANBUL</option>
  </select>
  <span class="select2 select2-container">
    <span class="select2-selection select2-selection--single" role="combobox"
          aria-labelledby="select2-departure-container" tabindex="0">
      <span class="select2-selection__rendered" id="select2-departure-container"
            title="Kalkış Noktası: Seçiniz">Kalkış Noktası: Seçiniz</span>
    </span>
  </span>
  <select id="arrival" name="arrival" style="display:none">
    <option value=""></option>
    <option value="6700">ZONGULDAK</option>
    <option value="8100">DÜZCE</option>
    <option value="0600">ANKARA</option>
    <option value="3400">İSTANBUL</option>
  </select>
  <span class="select2 select2-container">
    <span class="select2-selection select2-selection--single" role="combobox"
          aria-labelledby="select2-arrival-container" tabindex="0">
      <span class="select2-selection__rendered" id="select2-arrival-container"
            title="Varış Noktası: Seçiniz">Varış Noktası: Seçiniz</span>
    </span>
  </span>"#;

const SELECT2_DROPDOWN_OPEN: &str = r#"<span class="select2-container select2-container--open hidden" id="select2-dropdown">
  <span class="select2-dropdown">
    <span class="select2-search"><input class="select2-search__field" type="search" autocomplete="off"></span>
    <ul class="select2-results__options" id="select2-results"></ul>
  </span>
</span>"#;

const SELECT2_DROPDOWN_PLAIN: &str = r#"<span class="select2-container hidden" id="select2-dropdown">
  <span class="select2-dropdown">
    <ul class="select2-results__options" id="select2-results"></ul>
  </span>
</span>"#;

const COOKIE_JS: &str = r#"
document.getElementById('cookie-accept').addEventListener('click', function () {
  document.getElementById('cookie-popup').classList.add('hidden');
});
"#;

const WELCOME_JS: &str = r#"
(function () {
  var name = new URLSearchParams(window.location.search).get('welcome');
  var banner = document.querySelector('.welcome-message');
  if (name && banner) {
    banner.textContent = 'Hoş geldiniz, ' + name;
    banner.classList.remove('hidden');
  }
})();
"#;

const SELECT2_JS: &str = r#"
(function () {
  var dropdown = document.getElementById('select2-dropdown');
  var results = document.getElementById('select2-results');
  var search = dropdown.querySelector('.select2-search__field');
  var activeKey = null;

  function renderOptions() {
    if (!activeKey) { return; }
    var select = document.getElementById(activeKey);
    var term = search ? search.value.toLocaleLowerCase('tr') : '';
    results.innerHTML = '';
    for (var i = 1; i < select.options.length; i++) {
      var text = select.options[i].text;
      if (term && text.toLocaleLowerCase('tr').indexOf(term) === -1) { continue; }
      var li = document.createElement('li');
      li.className = 'select2-results__option';
      li.setAttribute('role', 'option');
      li.id = 'select2-' + activeKey + '-result-' + select.options[i].value;
      li.textContent = text;
      li.setAttribute('data-index', String(i));
      results.appendChild(li);
    }
  }

  function openDropdown(key, anchor) {
    activeKey = key;
    results.innerHTML = '';
    var rect = anchor.getBoundingClientRect();
    dropdown.style.top = (rect.bottom + window.scrollY) + 'px';
    dropdown.classList.remove('hidden');
    if (search) {
      search.value = '';
      search.focus();
    }
    // Options arrive late, like the real widget fetching them.
    setTimeout(renderOptions, 300);
  }

  function closeDropdown() {
    dropdown.classList.add('hidden');
    activeKey = null;
  }

  ['departure', 'arrival'].forEach(function (key) {
    var select = document.getElementById(key);
    select.addEventListener('change', function () {
      var rendered = document.getElementById('select2-' + key + '-container');
      var text = select.options[select.selectedIndex].text;
      rendered.textContent = text;
      rendered.setAttribute('title', text);
    });
    var selection = document.querySelector('[aria-labelledby="select2-' + key + '-container"]');
    selection.addEventListener('click', function () { openDropdown(key, selection); });
  });

  if (search) { search.addEventListener('input', renderOptions); }
  results.addEventListener('click', function (e) {
    var li = e.target.closest('li.select2-results__option');
    if (!li || !activeKey) { return; }
    var select = document.getElementById(activeKey);
    select.selectedIndex = parseInt(li.getAttribute('data-index'), 10);
    select.dispatchEvent(new Event('change', { bubbles: true }));
    closeDropdown();
  });
})();
"#;

const AUTOCOMPLETE_JS: &str = r#"
(function () {
  var CITIES = ['ZONGULDAK', 'DÜZCE', 'ANKARA', 'İSTANBUL'];
  ['from', 'to'].forEach(function (id) {
    var input = document.getElementById(id);
    var list = document.getElementById(id + '-list');
    input.addEventListener('input', function () {
      var term = input.value.toLocaleLowerCase('tr');
      list.innerHTML = '';
      CITIES.forEach(function (city) {
        if (term && city.toLocaleLowerCase('tr').indexOf(term) > -1) {
          var li = document.createElement('li');
          li.textContent = city;
          list.appendChild(li);
        }
      });
      list.classList.toggle('hidden', list.children.length === 0);
    });
    list.addEventListener('click', function (e) {
      if (e.target.tagName !== 'LI') { return; }
      input.value = e.target.textContent;
      list.classList.add('hidden');
    });
  });
})();
"#;

const CALENDAR_JS: &str = r#"
(function () {
  var LABELS = {
    tr: ['Ocak', 'Şubat', 'Mart', 'Nisan', 'Mayıs', 'Haziran', 'Temmuz',
         'Ağustos', 'Eylül', 'Ekim', 'Kasım', 'Aralık'],
    en: ['January', 'February', 'March', 'April', 'May', 'June', 'July',
         'August', 'September', 'October', 'November', 'December']
  };
  var picker = document.getElementById('datepicker');
  var months = LABELS[picker.getAttribute('data-labels') || 'tr'];
  var frozen = picker.getAttribute('data-frozen') === 'true';
  var cellClass = picker.getAttribute('data-cell') || 'day';
  var header = picker.querySelector('th.datepicker-switch');
  var body = picker.querySelector('tbody');
  var input = document.getElementById(picker.getAttribute('data-input') || 'date');
  var shown = { year: 2025, month: 2 };

  function pad(n) { return n < 10 ? '0' + n : String(n); }

  function render() {
    header.textContent = months[shown.month] + ' ' + shown.year;
    body.innerHTML = '';
    var first = new Date(shown.year, shown.month, 1);
    var lead = (first.getDay() + 6) % 7;
    for (var w = 0; w < 6; w++) {
      var tr = document.createElement('tr');
      for (var d = 0; d < 7; d++) {
        var day = new Date(shown.year, shown.month, 1 - lead + w * 7 + d);
        var td = document.createElement('td');
        td.className = cellClass;
        if (day.getMonth() !== shown.month) {
          td.className += day < first ? ' old' : ' new';
        }
        td.textContent = String(day.getDate());
        td.setAttribute('data-value', pad(day.getDate()) + '/' + pad(day.getMonth() + 1) + '/' + day.getFullYear());
        tr.appendChild(td);
      }
      body.appendChild(tr);
    }
  }

  function move(step) {
    if (!frozen) {
      shown.month += step;
      if (shown.month < 0) { shown.month = 11; shown.year -= 1; }
      if (shown.month > 11) { shown.month = 0; shown.year += 1; }
    }
    render();
  }

  input.addEventListener('click', function () {
    var rect = input.getBoundingClientRect();
    picker.style.top = (rect.bottom + window.scrollY) + 'px';
    render();
    picker.classList.remove('hidden');
  });
  picker.querySelector('th.prev').addEventListener('click', function () { move(-1); });
  picker.querySelector('th.next').addEventListener('click', function () { move(1); });
  body.addEventListener('click', function (e) {
    var td = e.target.closest('td');
    if (!td) { return; }
    input.value = td.getAttribute('data-value');
    input.dispatchEvent(new Event('change', { bubbles: true }));
    picker.classList.add('hidden');
  });
})();
"#;

/// The same form without any widget library: native selects, a plain date
/// input and a generic submit button. Only the fallbacks can drive it.
pub const BARE_PAGE: &str = r##"<!DOCTYPE html>
<html lang="tr">
<head><meta charset="utf-8"><title>Sefer Ara</title></head>
<body>
<form action="/sefer" method="get">
  <select id="departure" name="departure">
    <option value=""></option>
    <option value="6700">ZONGULDAK</option>
    <option value="8100">DÜZCE</option>
  </select>
  <select id="arrival" name="arrival">
    <option value=""></option>
    <option value="6700">ZONGULDAK</option>
    <option value="8100">DÜZCE</option>
  </select>
  <input type="text" name="tarih" placeholder="gg/aa/yyyy">
  <input type="submit" value="Ara">
</form>
</body>
</html>
"##;

pub const RESULTS_PAGE: &str = r##"<!DOCTYPE html>
<html lang="tr">
<head><meta charset="utf-8"><title>Sefer Listesi</title></head>
<body>
<h1>Sefer Listesi</h1>
<div class="search-results">
  <div class="sefer">09:30 ZONGULDAK - DÜZCE</div>
</div>
</body>
</html>
"##;

/// Accepts demo/demo and sends the member back to the homepage greeting.
pub const LOGIN_PAGE: &str = r##"<!DOCTYPE html>
<html lang="tr">
<head><meta charset="utf-8"><title>Üye Girişi</title><style>.hidden { display: none; }</style></head>
<body>
<form id="login-form">
  <input type="text" id="username">
  <input type="password" id="password">
  <button type="submit" id="loginButton">Giriş</button>
</form>
<div class="error-message hidden"></div>
<script>
document.getElementById('login-form').addEventListener('submit', function (e) {
  e.preventDefault();
  var user = document.getElementById('username').value;
  var ok = user === 'demo' && document.getElementById('password').value === 'demo';
  var error = document.querySelector('.error-message');
  if (ok) {
    window.location.href = '/?welcome=' + encodeURIComponent(user);
  } else {
    error.textContent = 'Invalid username or password';
    error.classList.remove('hidden');
  }
});
</script>
</body>
</html>
"##;
