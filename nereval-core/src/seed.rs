//! # Embedded Seed Data
//!
//! Small hand-annotated BIO corpora and gazetteer lists for German, English
//! and Dutch. The backends build themselves from this data at load time:
//! the statistical taggers train on the sentences, the rule engine loads the
//! gazetteers.
//!
//! German sentences use CoNLL labels, English and Dutch use OntoNotes labels,
//! matching [`Language::scheme`]. The multilingual seed is the union of all
//! three, relabelled to CoNLL.

use std::collections::BTreeSet;

use crate::lang::{LabelScheme, Language};

/// A sentence annotated in BIO format.
pub struct SeedSentence {
    pub text: &'static str,
    /// `(word, BIO tag)` pairs, e.g. `[("Anna", "B-PER"), ("schläft", "O")]`.
    pub annotations: &'static [(&'static str, &'static str)],
}

/// Words and tags of a sentence, owned, in any scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSentence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

/// Known names by category, lowercase, in the order persons, locations,
/// organisations, miscellaneous.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GazetteerEntries {
    pub persons: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub organizations: BTreeSet<String>,
    pub misc: BTreeSet<String>,
}

impl GazetteerEntries {
    pub fn extend(&mut self, other: GazetteerEntries) {
        self.persons.extend(other.persons);
        self.locations.extend(other.locations);
        self.organizations.extend(other.organizations);
        self.misc.extend(other.misc);
    }

    pub fn len(&self) -> usize {
        self.persons.len() + self.locations.len() + self.organizations.len() + self.misc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Seed sentences for a language.
pub fn seed_sentences(language: Language) -> &'static [SeedSentence] {
    match language {
        Language::German => GERMAN,
        Language::English => ENGLISH,
        Language::Dutch => DUTCH,
    }
}

/// Seed sentences as owned word/tag sequences, labels in the scheme of the
/// language.
///
/// `None` selects the multilingual seed: every language, relabelled to CoNLL.
pub fn tagged_sentences(language: Option<Language>) -> Vec<TaggedSentence> {
    let languages: Vec<Language> = match language {
        Some(l) => vec![l],
        None => Language::ALL.to_vec(),
    };
    let target = match language {
        Some(l) => l.scheme(),
        None => LabelScheme::Conll,
    };

    languages
        .into_iter()
        .flat_map(|l| {
            let source = l.scheme();
            seed_sentences(l).iter().map(move |s| TaggedSentence {
                words: s.annotations.iter().map(|(w, _)| w.to_string()).collect(),
                tags: s
                    .annotations
                    .iter()
                    .map(|(_, t)| relabel(t, source, target))
                    .collect(),
            })
        })
        .collect()
}

fn relabel(tag: &str, source: LabelScheme, target: LabelScheme) -> String {
    match tag.split_once('-') {
        Some((prefix, label)) => match source.convert(label, target) {
            Some(converted) => format!("{prefix}-{converted}"),
            None => "O".to_string(),
        },
        None => tag.to_string(),
    }
}

/// Gazetteer entries found in the seed sentences of `language`.
///
/// Entities are grouped by their person/location/organisation/misc label in
/// the language's scheme; labels outside those four are ignored.
pub fn extract_gazetteers_from_seed(language: Language) -> GazetteerEntries {
    let scheme = language.scheme();
    let mut entries = GazetteerEntries::default();

    for sentence in seed_sentences(language) {
        let mut words: Vec<&str> = vec![];
        let mut current = "";

        // A trailing "O" closes the last entity.
        for &(word, tag) in sentence.annotations.iter().chain(std::iter::once(&("", "O"))) {
            let (prefix, label) = tag.split_once('-').unwrap_or(("O", ""));
            if prefix == "I" && label == current {
                words.push(word);
                continue;
            }
            if !words.is_empty() {
                let name = words.join(" ").to_lowercase();
                let bucket = if current == scheme.person() {
                    Some(&mut entries.persons)
                } else if current == scheme.location() || current == "LOC" {
                    Some(&mut entries.locations)
                } else if current == scheme.organization() {
                    Some(&mut entries.organizations)
                } else if current == scheme.misc() {
                    Some(&mut entries.misc)
                } else {
                    None
                };
                if let Some(bucket) = bucket {
                    bucket.insert(name);
                }
                words.clear();
            }
            if prefix == "B" || prefix == "I" {
                words.push(word);
                current = label;
            } else {
                current = "";
            }
        }
    }

    entries
}

/// Curated gazetteer lists for `language`, on top of what the seed contains.
pub fn curated_gazetteers(language: Language) -> GazetteerEntries {
    let (persons, locations, organizations, misc): (&[&str], &[&str], &[&str], &[&str]) =
        match language {
            Language::German => (
                &[
                    "angela merkel", "olaf scholz", "goethe", "schiller", "beethoven", "mozart",
                    "albert einstein", "thomas müller", "anna", "maria", "peter", "klaus",
                ],
                &[
                    "deutschland", "österreich", "schweiz", "berlin", "hamburg", "münchen",
                    "köln", "frankfurt", "wien", "zürich", "europa", "bayern", "rhein",
                    "frankfurt am main", "baden-württemberg", "amerika", "frankreich",
                ],
                &[
                    "siemens", "volkswagen", "bmw", "deutsche bahn", "bundestag",
                    "bayern münchen", "lufthansa", "europäische union", "uno",
                ],
                &["deutsche", "deutsch", "englisch", "bundesliga", "weihnachten", "oktoberfest"],
            ),
            Language::English => (
                &[
                    "tom", "mary", "john", "peter parker", "shakespeare", "barack obama",
                    "queen elizabeth", "albert einstein", "alice", "bob",
                ],
                &[
                    "london", "paris", "new york", "boston", "england", "france", "germany",
                    "japan", "america", "canada", "australia", "united states", "china",
                    "europe", "tokyo",
                ],
                &[
                    "google", "microsoft", "apple", "united nations", "bbc", "nasa",
                    "harvard university", "fbi", "the white house",
                ],
                &["american", "british", "english", "german", "japanese", "french", "christian"],
            ),
            Language::Dutch => (
                &[
                    "tom", "maria", "jan", "piet", "rembrandt", "vincent van gogh", "willem",
                    "mark rutte", "anne frank",
                ],
                &[
                    "nederland", "belgië", "amsterdam", "rotterdam", "den haag", "utrecht",
                    "brussel", "antwerpen", "duitsland", "frankrijk", "europa", "amerika",
                    "japan",
                ],
                &[
                    "philips", "shell", "ajax", "feyenoord", "ns", "tweede kamer",
                    "europese unie", "heineken",
                ],
                &["nederlands", "nederlandse", "duits", "duitse", "engels", "belgische", "amerikaanse"],
            ),
        };

    let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
    GazetteerEntries {
        persons: owned(persons),
        locations: owned(locations),
        organizations: owned(organizations),
        misc: owned(misc),
    }
}

const GERMAN: &[SeedSentence] = &[
    SeedSentence {
        text: "Tom wohnt in Berlin.",
        annotations: &[("Tom", "B-PER"), ("wohnt", "O"), ("in", "O"), ("Berlin", "B-LOC"), (".", "O")],
    },
    SeedSentence {
        text: "Maria arbeitet bei Siemens in München.",
        annotations: &[
            ("Maria", "B-PER"), ("arbeitet", "O"), ("bei", "O"), ("Siemens", "B-ORG"),
            ("in", "O"), ("München", "B-LOC"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Angela Merkel war Bundeskanzlerin von Deutschland.",
        annotations: &[
            ("Angela", "B-PER"), ("Merkel", "I-PER"), ("war", "O"), ("Bundeskanzlerin", "O"),
            ("von", "O"), ("Deutschland", "B-LOC"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Ich fahre morgen mit der Deutschen Bahn nach Hamburg.",
        annotations: &[
            ("Ich", "O"), ("fahre", "O"), ("morgen", "O"), ("mit", "O"), ("der", "O"),
            ("Deutschen", "B-ORG"), ("Bahn", "I-ORG"), ("nach", "O"), ("Hamburg", "B-LOC"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Die Deutschen trinken gerne Bier.",
        annotations: &[
            ("Die", "O"), ("Deutschen", "B-MISC"), ("trinken", "O"), ("gerne", "O"),
            ("Bier", "O"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Herr Schmidt hat mit Volkswagen telefoniert.",
        annotations: &[
            ("Herr", "O"), ("Schmidt", "B-PER"), ("hat", "O"), ("mit", "O"),
            ("Volkswagen", "B-ORG"), ("telefoniert", "O"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Wien ist die Hauptstadt von Österreich.",
        annotations: &[
            ("Wien", "B-LOC"), ("ist", "O"), ("die", "O"), ("Hauptstadt", "O"), ("von", "O"),
            ("Österreich", "B-LOC"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Das Wetter ist heute schön.",
        annotations: &[
            ("Das", "O"), ("Wetter", "O"), ("ist", "O"), ("heute", "O"), ("schön", "O"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Peter spielt für Bayern München in der Bundesliga.",
        annotations: &[
            ("Peter", "B-PER"), ("spielt", "O"), ("für", "O"), ("Bayern", "B-ORG"),
            ("München", "I-ORG"), ("in", "O"), ("der", "O"), ("Bundesliga", "B-MISC"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Goethe wurde in Frankfurt geboren.",
        annotations: &[
            ("Goethe", "B-PER"), ("wurde", "O"), ("in", "O"), ("Frankfurt", "B-LOC"),
            ("geboren", "O"), (".", "O"),
        ],
    },
];

const ENGLISH: &[SeedSentence] = &[
    SeedSentence {
        text: "I like London.",
        annotations: &[("I", "O"), ("like", "O"), ("London", "B-GPE"), (".", "O")],
    },
    SeedSentence {
        text: "His name is Peter Parker.",
        annotations: &[
            ("His", "O"), ("name", "O"), ("is", "O"), ("Peter", "B-PERSON"), ("Parker", "I-PERSON"),
            (".", "O"),
        ],
    },
    SeedSentence {
        text: "Tom works for Google in New York.",
        annotations: &[
            ("Tom", "B-PERSON"), ("works", "O"), ("for", "O"), ("Google", "B-ORG"), ("in", "O"),
            ("New", "B-GPE"), ("York", "I-GPE"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Mary was born in 1990.",
        annotations: &[
            ("Mary", "B-PERSON"), ("was", "O"), ("born", "O"), ("in", "O"), ("1990", "B-DATE"),
            (".", "O"),
        ],
    },
    SeedSentence {
        text: "The Americans won the first game.",
        annotations: &[
            ("The", "O"), ("Americans", "B-NORP"), ("won", "O"), ("the", "O"),
            ("first", "B-ORDINAL"), ("game", "O"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Microsoft paid $5 million for the company.",
        annotations: &[
            ("Microsoft", "B-ORG"), ("paid", "O"), ("$", "B-MONEY"), ("5", "I-MONEY"),
            ("million", "I-MONEY"), ("for", "O"), ("the", "O"), ("company", "O"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Mr. Jackson flew to Japan with three friends.",
        annotations: &[
            ("Mr.", "O"), ("Jackson", "B-PERSON"), ("flew", "O"), ("to", "O"), ("Japan", "B-GPE"),
            ("with", "O"), ("three", "B-CARDINAL"), ("friends", "O"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "It is raining again.",
        annotations: &[("It", "O"), ("is", "O"), ("raining", "O"), ("again", "O"), (".", "O")],
    },
    SeedSentence {
        text: "We visited the Eiffel Tower on Monday.",
        annotations: &[
            ("We", "O"), ("visited", "O"), ("the", "O"), ("Eiffel", "B-FAC"), ("Tower", "I-FAC"),
            ("on", "O"), ("Monday", "B-DATE"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "She reads Hamlet in English.",
        annotations: &[
            ("She", "O"), ("reads", "O"), ("Hamlet", "B-WORK_OF_ART"), ("in", "O"),
            ("English", "B-LANGUAGE"), (".", "O"),
        ],
    },
];

const DUTCH: &[SeedSentence] = &[
    SeedSentence {
        text: "Tom woont in Amsterdam.",
        annotations: &[("Tom", "B-PERSON"), ("woont", "O"), ("in", "O"), ("Amsterdam", "B-GPE"), (".", "O")],
    },
    SeedSentence {
        text: "Maria werkt bij Philips in Eindhoven.",
        annotations: &[
            ("Maria", "B-PERSON"), ("werkt", "O"), ("bij", "O"), ("Philips", "B-ORG"), ("in", "O"),
            ("Eindhoven", "B-GPE"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Rembrandt schilderde De Nachtwacht.",
        annotations: &[
            ("Rembrandt", "B-PERSON"), ("schilderde", "O"), ("De", "B-WORK_OF_ART"),
            ("Nachtwacht", "I-WORK_OF_ART"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "De Nederlandse regering zit in Den Haag.",
        annotations: &[
            ("De", "O"), ("Nederlandse", "B-NORP"), ("regering", "O"), ("zit", "O"), ("in", "O"),
            ("Den", "B-GPE"), ("Haag", "I-GPE"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Ajax won zondag de wedstrijd.",
        annotations: &[
            ("Ajax", "B-ORG"), ("won", "O"), ("zondag", "B-DATE"), ("de", "O"), ("wedstrijd", "O"),
            (".", "O"),
        ],
    },
    SeedSentence {
        text: "Ik heb drie katten.",
        annotations: &[("Ik", "O"), ("heb", "O"), ("drie", "B-CARDINAL"), ("katten", "O"), (".", "O")],
    },
    SeedSentence {
        text: "Meneer Jansen reist naar België.",
        annotations: &[
            ("Meneer", "O"), ("Jansen", "B-PERSON"), ("reist", "O"), ("naar", "O"),
            ("België", "B-GPE"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Het regent vandaag.",
        annotations: &[("Het", "O"), ("regent", "O"), ("vandaag", "B-DATE"), (".", "O")],
    },
    SeedSentence {
        text: "Jan kwam als eerste aan in Rotterdam.",
        annotations: &[
            ("Jan", "B-PERSON"), ("kwam", "O"), ("als", "O"), ("eerste", "B-ORDINAL"), ("aan", "O"),
            ("in", "O"), ("Rotterdam", "B-GPE"), (".", "O"),
        ],
    },
    SeedSentence {
        text: "Zij spreekt Engels en Duits.",
        annotations: &[
            ("Zij", "O"), ("spreekt", "O"), ("Engels", "B-LANGUAGE"), ("en", "O"),
            ("Duits", "B-LANGUAGE"), (".", "O"),
        ],
    },
];
