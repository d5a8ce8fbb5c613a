// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Built-in starter catalog used when nothing has been saved or imported yet.

use crate::model::{AudioItem, catalog::Catalog};

struct SeedRelease {
    title: &'static str,
    year: i32,
    tracks: &'static [(&'static str, u32)],
}

struct SeedArtist {
    name: &'static str,
    genres: &'static [&'static str],
    releases: &'static [SeedRelease],
}

const ARTISTS: &[SeedArtist] = &[
    SeedArtist {
        name: "Queen",
        genres: &["Rock", "Classic Rock"],
        releases: &[SeedRelease {
            title: "A Night at the Opera",
            year: 1975,
            tracks: &[("Bohemian Rhapsody", 354), ("Love of My Life", 219)],
        }],
    },
    SeedArtist {
        name: "Eagles",
        genres: &["Rock", "Country Rock"],
        releases: &[SeedRelease {
            title: "Hotel California",
            year: 1976,
            tracks: &[("Hotel California", 390)],
        }],
    },
    SeedArtist {
        name: "Ed Sheeran",
        genres: &["Pop", "Folk"],
        releases: &[SeedRelease {
            title: "÷ (Divide)",
            year: 2017,
            tracks: &[("Shape of You", 233), ("Castle on the Hill", 261)],
        }],
    },
    SeedArtist {
        name: "The Weeknd",
        genres: &["R&B", "Pop"],
        releases: &[SeedRelease {
            title: "After Hours",
            year: 2020,
            tracks: &[("Blinding Lights", 200), ("Save Your Tears", 215)],
        }],
    },
    SeedArtist {
        name: "Daft Punk",
        genres: &["Electronic", "House"],
        releases: &[SeedRelease {
            title: "Random Access Memories",
            year: 2013,
            tracks: &[("Get Lucky", 369), ("Instant Crush", 337)],
        }],
    },
    SeedArtist {
        name: "Luiz Gonzaga",
        genres: &["Forró", "Baião"],
        releases: &[SeedRelease {
            title: "O Rei do Baião",
            year: 1950,
            tracks: &[
                ("Asa Branca", 195),
                ("O Xote das Meninas", 230),
                ("Pagode Russo", 210),
                ("A Vida do Viajante", 245),
                ("Numa Sala de Reboco", 188),
            ],
        }],
    },
    SeedArtist {
        name: "Zé Ramalho",
        genres: &["MPB", "Folk Brasileiro"],
        releases: &[SeedRelease {
            title: "Avohai",
            year: 1978,
            tracks: &[
                ("Chão de Giz", 270),
                ("Avohai", 300),
                ("Frevo Mulher", 220),
                ("Admirável Gado Novo", 290),
                ("Sinônimos", 310),
            ],
        }],
    },
];

const EPISODES: &[(&str, u32, &str, u32)] = &[
    ("Tech News #1", 1200, "TechDaily", 1),
    ("História do Java", 3600, "DevCast", 42),
    ("Carreira em TI", 2400, "DevCast", 43),
];

/// Fills an empty catalog with the starter artists, releases and episodes.
///
/// Returns the number of items added, zero if the catalog already held items.
pub(crate) fn populate(catalog: &mut Catalog) -> usize {
    if !catalog.is_empty() {
        return 0;
    }

    for artist in ARTISTS {
        let author = catalog.get_or_create_author(artist.name);
        for genre in artist.genres {
            catalog.add_genre(author, genre);
        }

        for release in artist.releases {
            let release_id = catalog.create_release(release.title, author, release.year);
            for (title, secs) in release.tracks {
                catalog.add_track(title, *secs, author, Some(release_id));
            }
        }
    }

    for (title, secs, host, number) in EPISODES {
        catalog.add_item(AudioItem::episode(*title, *secs, *host, *number));
    }

    tracing::info!(items = catalog.len(), "Seeded default catalog");

    catalog.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_only_an_empty_catalog() {
        let mut catalog = Catalog::new();

        let added = populate(&mut catalog);
        assert_eq!(added, 22);
        assert_eq!(populate(&mut catalog), 0);
        assert_eq!(catalog.len(), 22);
    }

    #[test]
    fn seeded_catalog_is_searchable() {
        let mut catalog = Catalog::new();
        populate(&mut catalog);

        assert_eq!(catalog.search("queen").len(), 2);
        assert_eq!(catalog.search("devcast").len(), 0);
        assert_eq!(catalog.search("carreira em ti").len(), 1);
        assert_eq!(catalog.search("AVOHAI").len(), 1);

        let queen = catalog.get_or_create_author("QUEEN");
        assert_eq!(catalog.author(queen).unwrap().genres().len(), 2);

        let opera = catalog
            .releases()
            .find(|r| r.title() == "A Night at the Opera")
            .unwrap();
        assert_eq!(opera.tracks().len(), 2);
    }
}
