use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Known-good locale paths per market. Some markets only render their plan
/// picker under a specific language subpath.
const DEFAULT_LOCALES: &[(&str, &[&str])] = &[
    ("my", &["/my/en", "/my/zh", "/my/ms"]),
    ("hk", &["/hk/en", "/hk/zh"]),
    ("ph", &["/ph/en", "/ph/tl"]),
    ("tw", &["/tw/en", "/tw/zh"]),
    ("id", &["/id/en", "/id/id"]),
    ("sg", &["/sg/en", "/sg/ms"]),
    ("th", &["/th/en", "/th/th"]),
    ("co", &["/co/es"]),
    ("cr", &["/cr/es"]),
    ("gt", &["/gt/es"]),
    ("pe", &["/pe/es"]),
    ("uy", &["/uy/es"]),
    ("mx", &["/mx/es"]),
    ("hn", &["/hn/es"]),
    ("ni", &["/ni/es"]),
    ("pa", &["/pa/es"]),
    ("ar", &["/ar/es"]),
    ("bo", &["/bo/es"]),
    ("do", &["/do/es"]),
    ("ec", &["/ec/es"]),
    ("sv", &["/sv/es"]),
    ("py", &["/py/es"]),
    ("cl", &["/cl/es"]),
    ("br", &["/br/pt"]),
    ("jm", &["/jm/en"]),
    ("ms", &["/ms/en"]),
    ("ai", &["/ai/en"]),
    ("ag", &["/ag/en"]),
    ("aw", &["/aw/en"]),
    ("bs", &["/bs/en"]),
    ("bb", &["/bb/en"]),
    ("bz", &["/bz/en"]),
    ("vg", &["/vg/en"]),
    ("ky", &["/ky/en"]),
    ("cw", &["/cw/en"]),
    ("dm", &["/dm/en"]),
    ("gd", &["/gd/en"]),
    ("gy", &["/gy/en"]),
    ("ht", &["/ht/en"]),
    ("kn", &["/kn/en"]),
    ("lc", &["/lc/en"]),
    ("vc", &["/vc/en"]),
    ("sr", &["/sr/en"]),
    ("tt", &["/tt/en"]),
    ("tc", &["/tc/en"]),
    ("us", &["/us/en", "/us/es"]),
    ("au", &["/au/en"]),
    ("ad", &["/ad/en", "/ad/es"]),
    ("ba", &["/ba/en", "/ba/hr"]),
    ("bg", &["/bg/en", "/bg/bg"]),
    ("hr", &["/hr/en", "/hr/hr"]),
    ("cz", &["/cz/en", "/cz/cs"]),
    ("hu", &["/hu/en", "/hu/hu"]),
    ("mk", &["/mk/en", "/mk/mk"]),
    ("md", &["/md/en", "/md/ro"]),
    ("me", &["/me/en", "/me/sr"]),
    ("ro", &["/ro/en", "/ro/ro"]),
    ("rs", &["/rs/en", "/rs/sr"]),
    ("sk", &["/sk/en", "/sk/sk"]),
    ("si", &["/si/en", "/si/sl"]),
    ("dk", &["/dk/en", "/dk/da"]),
    ("fi", &["/fi/en", "/fi/fi"]),
    ("no", &["/no/en", "/no/no"]),
    ("se", &["/se/en", "/se/sv"]),
    ("es", &["/es/en", "/es/es"]),
    ("fr", &["/fr/en", "/fr/fr"]),
    ("be", &["/be/en", "/be/nl", "/be/fr"]),
    ("pt", &["/pt/en", "/pt/pt"]),
    ("nl", &["/nl/en", "/nl/nl"]),
    ("pl", &["/pl/pl"]),
    ("tr", &["/tr/en", "/tr/tr"]),
];

/// Immutable map of lowercase country code to ordered locale path suffixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleTable {
    paths: HashMap<String, Vec<String>>,
}

impl LocaleTable {
    pub fn new<I, K, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<P>)>,
        K: AsRef<str>,
        P: Into<String>,
    {
        let paths = entries
            .into_iter()
            .map(|(code, paths)| {
                (
                    code.as_ref().to_ascii_lowercase(),
                    paths.into_iter().map(Into::into).collect(),
                )
            })
            .collect();

        LocaleTable { paths }
    }

    /// Parses a JSON object such as `{"sg": ["/sg/en", "/sg/ms"]}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(LocaleTable::new(raw))
    }

    pub fn get(&self, code: &str) -> Option<&[String]> {
        self.paths
            .get(&code.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// Entries sorted by country code.
    pub fn entries(&self) -> Vec<(&str, &[String])> {
        let mut entries: Vec<_> = self
            .paths
            .iter()
            .map(|(code, paths)| (code.as_str(), paths.as_slice()))
            .collect();
        entries.sort_by_key(|(code, _)| *code);
        entries
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Default for LocaleTable {
    fn default() -> Self {
        LocaleTable::new(
            DEFAULT_LOCALES
                .iter()
                .map(|(code, paths)| (*code, paths.to_vec())),
        )
    }
}
