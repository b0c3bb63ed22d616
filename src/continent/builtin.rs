use std::collections::HashMap;
use std::sync::Arc;

use super::classifier::{Classification, ContinentClassifier};

/// UN geoscheme regions keyed by World Bank economy names plus common aliases.
///
/// Regions use the coarse UN vocabulary ("Americas", "Oceania") on purpose:
/// turning them into the seven-continent taxonomy is the resolver's job.
/// Transcontinental countries list their UN region first.
const REGIONS: &[(&str, &[&str])] = &[
    // Africa
    ("Algeria", &["Africa"]),
    ("Angola", &["Africa"]),
    ("Benin", &["Africa"]),
    ("Botswana", &["Africa"]),
    ("Burkina Faso", &["Africa"]),
    ("Burundi", &["Africa"]),
    ("Cabo Verde", &["Africa"]),
    ("Cape Verde", &["Africa"]),
    ("Cameroon", &["Africa"]),
    ("Central African Republic", &["Africa"]),
    ("Chad", &["Africa"]),
    ("Comoros", &["Africa"]),
    ("Congo, Dem. Rep.", &["Africa"]),
    ("Democratic Republic of the Congo", &["Africa"]),
    ("Congo, Rep.", &["Africa"]),
    ("Republic of the Congo", &["Africa"]),
    ("Cote d'Ivoire", &["Africa"]),
    ("Ivory Coast", &["Africa"]),
    ("Djibouti", &["Africa"]),
    ("Egypt, Arab Rep.", &["Africa", "Asia"]),
    ("Egypt", &["Africa", "Asia"]),
    ("Equatorial Guinea", &["Africa"]),
    ("Eritrea", &["Africa"]),
    ("Eswatini", &["Africa"]),
    ("Swaziland", &["Africa"]),
    ("Ethiopia", &["Africa"]),
    ("Gabon", &["Africa"]),
    ("Gambia, The", &["Africa"]),
    ("Gambia", &["Africa"]),
    ("Ghana", &["Africa"]),
    ("Guinea", &["Africa"]),
    ("Guinea-Bissau", &["Africa"]),
    ("Kenya", &["Africa"]),
    ("Lesotho", &["Africa"]),
    ("Liberia", &["Africa"]),
    ("Libya", &["Africa"]),
    ("Madagascar", &["Africa"]),
    ("Malawi", &["Africa"]),
    ("Mali", &["Africa"]),
    ("Mauritania", &["Africa"]),
    ("Mauritius", &["Africa"]),
    ("Morocco", &["Africa"]),
    ("Mozambique", &["Africa"]),
    ("Namibia", &["Africa"]),
    ("Niger", &["Africa"]),
    ("Nigeria", &["Africa"]),
    ("Rwanda", &["Africa"]),
    ("Sao Tome and Principe", &["Africa"]),
    ("Senegal", &["Africa"]),
    ("Seychelles", &["Africa"]),
    ("Sierra Leone", &["Africa"]),
    ("Somalia", &["Africa"]),
    ("South Africa", &["Africa"]),
    ("South Sudan", &["Africa"]),
    ("Sudan", &["Africa"]),
    ("Tanzania", &["Africa"]),
    ("Togo", &["Africa"]),
    ("Tunisia", &["Africa"]),
    ("Uganda", &["Africa"]),
    ("Zambia", &["Africa"]),
    ("Zimbabwe", &["Africa"]),
    // Asia
    ("Afghanistan", &["Asia"]),
    ("Armenia", &["Asia"]),
    ("Azerbaijan", &["Asia"]),
    ("Bahrain", &["Asia"]),
    ("Bangladesh", &["Asia"]),
    ("Bhutan", &["Asia"]),
    ("Brunei Darussalam", &["Asia"]),
    ("Brunei", &["Asia"]),
    ("Cambodia", &["Asia"]),
    ("China", &["Asia"]),
    ("Cyprus", &["Asia", "Europe"]),
    ("Georgia", &["Asia"]),
    ("Hong Kong SAR, China", &["Asia"]),
    ("Hong Kong", &["Asia"]),
    ("India", &["Asia"]),
    ("Indonesia", &["Asia"]),
    ("Iran, Islamic Rep.", &["Asia"]),
    ("Iran", &["Asia"]),
    ("Iraq", &["Asia"]),
    ("Israel", &["Asia"]),
    ("Japan", &["Asia"]),
    ("Jordan", &["Asia"]),
    ("Kazakhstan", &["Asia", "Europe"]),
    ("Korea, Dem. People's Rep.", &["Asia"]),
    ("North Korea", &["Asia"]),
    ("Korea, Rep.", &["Asia"]),
    ("South Korea", &["Asia"]),
    ("Kuwait", &["Asia"]),
    ("Kyrgyz Republic", &["Asia"]),
    ("Kyrgyzstan", &["Asia"]),
    ("Lao PDR", &["Asia"]),
    ("Laos", &["Asia"]),
    ("Lebanon", &["Asia"]),
    ("Macao SAR, China", &["Asia"]),
    ("Macao", &["Asia"]),
    ("Malaysia", &["Asia"]),
    ("Maldives", &["Asia"]),
    ("Mongolia", &["Asia"]),
    ("Myanmar", &["Asia"]),
    ("Nepal", &["Asia"]),
    ("Oman", &["Asia"]),
    ("Pakistan", &["Asia"]),
    ("Philippines", &["Asia"]),
    ("Qatar", &["Asia"]),
    ("Saudi Arabia", &["Asia"]),
    ("Singapore", &["Asia"]),
    ("Sri Lanka", &["Asia"]),
    ("Syrian Arab Republic", &["Asia"]),
    ("Syria", &["Asia"]),
    ("Tajikistan", &["Asia"]),
    ("Thailand", &["Asia"]),
    ("Timor-Leste", &["Asia"]),
    ("Turkiye", &["Asia", "Europe"]),
    ("Turkey", &["Asia", "Europe"]),
    ("Turkmenistan", &["Asia"]),
    ("United Arab Emirates", &["Asia"]),
    ("Uzbekistan", &["Asia"]),
    ("Viet Nam", &["Asia"]),
    ("Vietnam", &["Asia"]),
    ("West Bank and Gaza", &["Asia"]),
    ("Palestine", &["Asia"]),
    ("Yemen, Rep.", &["Asia"]),
    ("Yemen", &["Asia"]),
    // Europe
    ("Albania", &["Europe"]),
    ("Andorra", &["Europe"]),
    ("Austria", &["Europe"]),
    ("Belarus", &["Europe"]),
    ("Belgium", &["Europe"]),
    ("Bosnia and Herzegovina", &["Europe"]),
    ("Bulgaria", &["Europe"]),
    ("Channel Islands", &["Europe"]),
    ("Croatia", &["Europe"]),
    ("Czechia", &["Europe"]),
    ("Czech Republic", &["Europe"]),
    ("Denmark", &["Europe"]),
    ("Estonia", &["Europe"]),
    ("Faroe Islands", &["Europe"]),
    ("Finland", &["Europe"]),
    ("France", &["Europe"]),
    ("Germany", &["Europe"]),
    ("Gibraltar", &["Europe"]),
    ("Greece", &["Europe"]),
    ("Hungary", &["Europe"]),
    ("Iceland", &["Europe"]),
    ("Ireland", &["Europe"]),
    ("Isle of Man", &["Europe"]),
    ("Italy", &["Europe"]),
    ("Kosovo", &["Europe"]),
    ("Latvia", &["Europe"]),
    ("Liechtenstein", &["Europe"]),
    ("Lithuania", &["Europe"]),
    ("Luxembourg", &["Europe"]),
    ("Malta", &["Europe"]),
    ("Moldova", &["Europe"]),
    ("Monaco", &["Europe"]),
    ("Montenegro", &["Europe"]),
    ("Netherlands", &["Europe"]),
    ("North Macedonia", &["Europe"]),
    ("Norway", &["Europe"]),
    ("Poland", &["Europe"]),
    ("Portugal", &["Europe"]),
    ("Romania", &["Europe"]),
    ("Russian Federation", &["Europe", "Asia"]),
    ("Russia", &["Europe", "Asia"]),
    ("San Marino", &["Europe"]),
    ("Serbia", &["Europe"]),
    ("Slovak Republic", &["Europe"]),
    ("Slovakia", &["Europe"]),
    ("Slovenia", &["Europe"]),
    ("Spain", &["Europe"]),
    ("Sweden", &["Europe"]),
    ("Switzerland", &["Europe"]),
    ("Ukraine", &["Europe"]),
    ("United Kingdom", &["Europe"]),
    // Americas
    ("Antigua and Barbuda", &["Americas"]),
    ("Argentina", &["Americas"]),
    ("Aruba", &["Americas"]),
    ("Bahamas, The", &["Americas"]),
    ("Bahamas", &["Americas"]),
    ("Barbados", &["Americas"]),
    ("Belize", &["Americas"]),
    ("Bermuda", &["Americas"]),
    ("Bolivia", &["Americas"]),
    ("Brazil", &["Americas"]),
    ("British Virgin Islands", &["Americas"]),
    ("Canada", &["Americas"]),
    ("Cayman Islands", &["Americas"]),
    ("Chile", &["Americas"]),
    ("Colombia", &["Americas"]),
    ("Costa Rica", &["Americas"]),
    ("Cuba", &["Americas"]),
    ("Curacao", &["Americas"]),
    ("Dominica", &["Americas"]),
    ("Dominican Republic", &["Americas"]),
    ("Ecuador", &["Americas"]),
    ("El Salvador", &["Americas"]),
    ("Greenland", &["Americas"]),
    ("Grenada", &["Americas"]),
    ("Guatemala", &["Americas"]),
    ("Guyana", &["Americas"]),
    ("Haiti", &["Americas"]),
    ("Honduras", &["Americas"]),
    ("Jamaica", &["Americas"]),
    ("Mexico", &["Americas"]),
    ("Nicaragua", &["Americas"]),
    ("Panama", &["Americas"]),
    ("Paraguay", &["Americas"]),
    ("Peru", &["Americas"]),
    ("Puerto Rico", &["Americas"]),
    ("Sint Maarten (Dutch part)", &["Americas"]),
    ("St. Kitts and Nevis", &["Americas"]),
    ("St. Lucia", &["Americas"]),
    ("St. Martin (French part)", &["Americas"]),
    ("St. Vincent and the Grenadines", &["Americas"]),
    ("Suriname", &["Americas"]),
    ("Trinidad and Tobago", &["Americas"]),
    ("Turks and Caicos Islands", &["Americas"]),
    ("United States", &["Americas"]),
    ("United States of America", &["Americas"]),
    ("Uruguay", &["Americas"]),
    ("Venezuela, RB", &["Americas"]),
    ("Venezuela", &["Americas"]),
    ("Virgin Islands (U.S.)", &["Americas"]),
    // Oceania
    ("American Samoa", &["Oceania"]),
    ("Australia", &["Oceania"]),
    ("Fiji", &["Oceania"]),
    ("French Polynesia", &["Oceania"]),
    ("Guam", &["Oceania"]),
    ("Kiribati", &["Oceania"]),
    ("Marshall Islands", &["Oceania"]),
    ("Micronesia, Fed. Sts.", &["Oceania"]),
    ("Micronesia", &["Oceania"]),
    ("Nauru", &["Oceania"]),
    ("New Caledonia", &["Oceania"]),
    ("New Zealand", &["Oceania"]),
    ("Northern Mariana Islands", &["Oceania"]),
    ("Palau", &["Oceania"]),
    ("Papua New Guinea", &["Oceania"]),
    ("Samoa", &["Oceania"]),
    ("Solomon Islands", &["Oceania"]),
    ("Tonga", &["Oceania"]),
    ("Tuvalu", &["Oceania"]),
    ("Vanuatu", &["Oceania"]),
];

/// Offline classifier backed by a static UN region table.
///
/// Lookups ignore ASCII case. Aggregates the World Bank publishes alongside
/// countries ("World", "Euro area", "High income", ...) are deliberately absent
/// and come back as an empty candidate list.
#[derive(Debug, Clone)]
pub struct BuiltinClassifier {
    table: Arc<HashMap<String, &'static [&'static str]>>,
}

impl Default for BuiltinClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinClassifier {
    pub fn new() -> Self {
        let table: HashMap<String, &'static [&'static str]> = REGIONS
            .iter()
            .map(|(name, regions)| (name.to_ascii_lowercase(), *regions))
            .collect();
        Self {
            table: Arc::new(table),
        }
    }

    pub fn lookup(&self, country: &str) -> Option<&'static [&'static str]> {
        self.table.get(&country.trim().to_ascii_lowercase()).copied()
    }
}

impl ContinentClassifier for BuiltinClassifier {
    fn kind(&self) -> &'static str {
        "builtin"
    }

    async fn classify(&self, country: &str) -> Classification {
        match self.lookup(country) {
            Some([single]) => Classification::Single(single.to_string()),
            Some(regions) => {
                Classification::Candidates(regions.iter().map(|r| r.to_string()).collect())
            }
            None => Classification::Candidates(Vec::new()),
        }
    }
}
