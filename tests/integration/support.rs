//! Scripted upstream for driving `ElectionResults` without a network

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use volby::error::TransportError;
use volby::source::{HttpResponse, Transport};

pub const BASE: &str = "https://volby.test/ps{year}/";

/// One recorded request
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub if_none_match: Option<String>,
}

/// Serves queued responses per URL; a URL with nothing queued answers 404
#[derive(Default)]
pub struct ScriptedUpstream {
    responses: RefCell<HashMap<String, VecDeque<HttpResponse>>>,
    pub requests: RefCell<Vec<Request>>,
}

impl ScriptedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(year: i32, resource: &str) -> String {
        format!("https://volby.test/ps{}/{}", year, resource)
    }

    pub fn push(&self, year: i32, resource: &str, response: HttpResponse) {
        self.responses
            .borrow_mut()
            .entry(Self::url(year, resource))
            .or_default()
            .push_back(response);
    }

    /// Queue a full HTML-generation election (results page and both chart scripts)
    pub fn publish_html(&self, year: i32, etag: &str, processed_percent: &str) {
        self.push(year, "ps2?xjazyk=EN", ok(&results_page(processed_percent), Some(etag)));
        self.push(year, "d3_rects?xjazyk=EN", ok(SEATS_SCRIPT, None));
        self.push(year, "d3_mapa?xjazyk=EN", ok(REGIONS_SCRIPT, None));
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for ScriptedUpstream {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(Request {
            url: url.to_string(),
            if_none_match: headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("if-none-match"))
                .map(|(_, value)| value.to_string()),
        });
        let next = self
            .responses
            .borrow_mut()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        Ok(next.unwrap_or_else(|| status(404)))
    }
}

pub fn ok(body: &str, etag: Option<&str>) -> HttpResponse {
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "text/html".to_string());
    if let Some(etag) = etag {
        headers.insert("etag".to_string(), etag.to_string());
    }
    HttpResponse {
        status: 200,
        headers,
        body: body.to_string(),
    }
}

pub fn status(code: u16) -> HttpResponse {
    HttpResponse {
        status: code,
        headers: BTreeMap::new(),
        body: String::new(),
    }
}

pub fn results_page(processed_percent: &str) -> String {
    format!(
        r#"<html><body>
        <table>
          <tr>
            <th colspan="3">Wards</th>
            <th rowspan="2">Voters in the electoral roll</th>
            <th rowspan="2">Issued envelopes</th>
            <th rowspan="2">Turnout in %</th>
            <th rowspan="2">Returned envelopes</th>
            <th rowspan="2">Valid votes</th>
            <th rowspan="2">% of valid votes</th>
          </tr>
          <tr><th>total</th><th>proc.</th><th>in %</th></tr>
          <tr>
            <td>14 761</td><td>8 413</td><td>{}</td><td>8 245 962</td><td>3 106 240</td>
            <td>37,67</td><td>3 104 112</td><td>3 088 571</td><td>99,50</td>
          </tr>
        </table>
        <table>
          <tr><th colspan="2">Party</th><th colspan="2">Valid votes</th></tr>
          <tr><th>number</th><th>name</th><th>total</th><th>in %</th></tr>
          <tr><td>11</td><td>SPOLU</td><td>734 180</td><td>23,77</td></tr>
          <tr><td>22</td><td>ANO</td><td>1 071 440</td><td>34,69</td></tr>
        </table>
        <table>
          <tr><th colspan="2">Party</th><th colspan="2">Valid votes</th></tr>
          <tr><th>number</th><th>name</th><th>total</th><th>in %</th></tr>
          <tr><td>20</td><td>Motoriste sobe</td><td>210 000</td><td>6,80</td></tr>
        </table>
        </body></html>"#,
        processed_percent
    )
}

pub const SEATS_SCRIPT: &str = r#"
    <script>
      let data = [
        {party: 'SPOLU', mandate: '30', color: '#23238e'},
        {party: 'ANO 2011', mandate: 80, color: '#261060'},
        {party: 'Spolu', mandate: 22},
        {party: 'Motoristé sobě', mandate: 13, color: '#000000'},
      ];
      drawRects(data);
    </script>"#;

pub const REGIONS_SCRIPT: &str = r#"
    <script>
      let data = {
        14: {region: 'Moravskoslezský kraj', party: 'ANO', percent: '45,10', votes: '120 000', processed: 61.5, color: '#261060', link: 'ps311?xjazyk=EN&xkraj=14'},
        1: {region: 'Hlavní město Praha', party: 'SPOLU', percent: 30.5, votes: 210000, processed: '58,2', color: '#23238e', link: 'ps311?xjazyk=EN&xkraj=1'},
        7: {region: "Kraj Vysočina", party: 'ANO', percent: 40, votes: 70000, processed: 66, link: 'ps311?xjazyk=EN&xkraj=7'}
      };
      drawMap(data);
    </script>"#;
