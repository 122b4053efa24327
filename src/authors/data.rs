//! The author catalog itself. Grounded in `torah_authors_master.py`'s
//! documented shape (primary name, variations/acronyms, era, region,
//! associated works, Sefaria-style ref pattern) - a representative slice
//! rather than the full upstream catalog, enough to exercise every level
//! SEARCH groups by.

use super::Author;
use crate::models::SourceLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorEra {
    Tannaic,
    Amoraic,
    Geonic,
    Rishon,
    Acharon,
}

pub static AUTHOR_CATALOG: &[Author] = &[
    Author {
        key: "rashi",
        primary_name_he: "רש\"י",
        variations: &["rashi", "rashi's", "shlomo yitzchaki", "rabbi shlomo yitzchaki"],
        era: AuthorEra::Rishon,
        region: "Troyes, France",
        works: &["Rashi on Talmud", "Rashi on Chumash"],
        level: SourceLevel::Rashi,
        ref_pattern: "Rashi on {}",
    },
    Author {
        key: "tosafos",
        primary_name_he: "תוספות",
        variations: &["tosfos", "tosafos", "tosafot", "tosfot", "baalei hatosfos"],
        era: AuthorEra::Rishon,
        region: "France & Germany",
        works: &["Tosafot"],
        level: SourceLevel::Tosfos,
        ref_pattern: "Tosafot on {}",
    },
    Author {
        key: "rambam",
        primary_name_he: "רמב\"ם",
        variations: &["rambam", "maimonides", "moshe ben maimon", "the rambam"],
        era: AuthorEra::Rishon,
        region: "Cordoba / Fustat",
        works: &["Mishneh Torah", "Moreh Nevuchim", "Commentary on the Mishnah"],
        level: SourceLevel::Rambam,
        ref_pattern: "Mishneh Torah, {}",
    },
    Author {
        key: "ramban",
        primary_name_he: "רמב\"ן",
        variations: &["ramban", "nachmanides", "moshe ben nachman"],
        era: AuthorEra::Rishon,
        region: "Girona, Catalonia",
        works: &["Chiddushei HaRamban", "Commentary on the Torah"],
        level: SourceLevel::Rishonim,
        ref_pattern: "Ramban on {}",
    },
    Author {
        key: "rosh",
        primary_name_he: "רא\"ש",
        variations: &["rosh", "asher ben yechiel", "rabbeinu asher"],
        era: AuthorEra::Rishon,
        region: "Germany / Toledo",
        works: &["Piskei HaRosh"],
        level: SourceLevel::Rishonim,
        ref_pattern: "Rosh on {}",
    },
    Author {
        key: "rif",
        primary_name_he: "רי\"ף",
        variations: &["rif", "yitzchak alfasi", "isaac alfasi"],
        era: AuthorEra::Rishon,
        region: "Fes",
        works: &["Sefer HaHalachot"],
        level: SourceLevel::Rishonim,
        ref_pattern: "Rif on {}",
    },
    Author {
        key: "tur",
        primary_name_he: "טור",
        variations: &["tur", "baal haturim", "yaakov ben asher"],
        era: AuthorEra::Rishon,
        region: "Toledo",
        works: &["Arba'ah Turim"],
        level: SourceLevel::Tur,
        ref_pattern: "Tur, {}",
    },
    Author {
        key: "shulchan_aruch",
        primary_name_he: "שולחן ערוך",
        variations: &["shulchan aruch", "shulchan aruch", "yosef karo", "the mechaber", "mechaber"],
        era: AuthorEra::Acharon,
        region: "Safed",
        works: &["Shulchan Aruch", "Beit Yosef"],
        level: SourceLevel::ShulchanAruch,
        ref_pattern: "Shulchan Arukh, {}",
    },
    Author {
        key: "rema",
        primary_name_he: "רמ\"א",
        variations: &["rema", "moshe isserles"],
        era: AuthorEra::Acharon,
        region: "Krakow",
        works: &["Mapah (glosses on Shulchan Aruch)", "Darchei Moshe"],
        level: SourceLevel::NoseiKeilim,
        ref_pattern: "Rema on {}",
    },
    Author {
        key: "shach",
        primary_name_he: "ש\"ך",
        variations: &["shach", "shabtai hakohen"],
        era: AuthorEra::Acharon,
        region: "Vilna",
        works: &["Siftei Kohen"],
        level: SourceLevel::NoseiKeilim,
        ref_pattern: "Siftei Kohen on {}",
    },
    Author {
        key: "taz",
        primary_name_he: "ט\"ז",
        variations: &["taz", "david halevi segal"],
        era: AuthorEra::Acharon,
        region: "Ostroh",
        works: &["Turei Zahav"],
        level: SourceLevel::NoseiKeilim,
        ref_pattern: "Turei Zahav on {}",
    },
    Author {
        key: "mishnah_berurah",
        primary_name_he: "משנה ברורה",
        variations: &["mishnah berurah", "mishna berura", "chofetz chaim", "yisrael meir kagan"],
        era: AuthorEra::Acharon,
        region: "Radin",
        works: &["Mishnah Berurah"],
        level: SourceLevel::Acharonim,
        ref_pattern: "Mishnah Berurah on {}",
    },
    Author {
        key: "chazon_ish",
        primary_name_he: "חזון איש",
        variations: &["chazon ish", "avraham yeshaya karelitz"],
        era: AuthorEra::Acharon,
        region: "Bnei Brak",
        works: &["Chazon Ish"],
        level: SourceLevel::Acharonim,
        ref_pattern: "Chazon Ish on {}",
    },
    Author {
        key: "maharsha",
        primary_name_he: "מהרש\"א",
        variations: &["maharsha", "shmuel eidels"],
        era: AuthorEra::Acharon,
        region: "Ostroh",
        works: &["Chiddushei Halachot", "Chiddushei Aggadot"],
        level: SourceLevel::Acharonim,
        ref_pattern: "Maharsha on {}",
    },
    Author {
        key: "rashba",
        primary_name_he: "רשב\"א",
        variations: &["rashba", "shlomo ben aderet"],
        era: AuthorEra::Rishon,
        region: "Barcelona",
        works: &["Chiddushei HaRashba"],
        level: SourceLevel::Rishonim,
        ref_pattern: "Rashba on {}",
    },
    Author {
        key: "ritva",
        primary_name_he: "ריטב\"א",
        variations: &["ritva", "yom tov ben avraham"],
        era: AuthorEra::Rishon,
        region: "Seville",
        works: &["Chiddushei HaRitva"],
        level: SourceLevel::Rishonim,
        ref_pattern: "Ritva on {}",
    },
];
