//! Built-in field tables, one per provider.
//!
//! Each table is curated against the provider's search response shape for a
//! single candidate. Where several paths feed one canonical field, the path
//! visited last in the response wins (see [`super::translate`]).

/// MusicBrainz recording search (`recording-list` entries).
pub const MUSICBRAINZ: &[(&str, &str)] = &[
    ("id", "mb_trackid"),
    ("ext:score", "score"),
    ("title", "title"),
    ("length", "length"),
    ("artist-credit[0].name", "artist"),
    ("artist-credit[0].artist.id", "mb_artistid"),
    ("artist-credit[0].artist.name", "artist"),
    ("artist-credit[0].artist.sort-name", "artist_sort"),
    ("artist-credit[1]", "artist_credit"),
    ("artist-credit-phrase", "artist_credit"),
    ("release-list[0].id", "mb_albumid"),
    ("release-list[0].title", "album"),
    ("release-list[0].status", "albumstatus"),
    ("release-list[0].date", "date"),
    ("release-list[0].country", "country"),
    ("release-list[0].release-event-list[0].date", "date"),
    ("release-list[0].release-event-list[0].area.name", "country"),
    ("release-list[0].artist-credit-phrase", "artist_credit"),
    ("release-list[0].artist-credit[0].name", "albumartist"),
    ("release-list[0].artist-credit[0].artist.id", "mb_albumartistid"),
    ("release-list[0].artist-credit[0].artist.name", "albumartist"),
    ("release-list[0].artist-credit[0].artist.sort-name", "albumartist_sort"),
    ("release-list[0].release-group.id", "mb_releasegroupid"),
    ("release-list[0].release-group.type", "albumtype"),
    ("release-list[0].release-group.primary-type", "albumtype"),
    ("release-list[0].release-group.title", "album"),
    ("release-list[0].medium-list[0].position", "disc"),
    ("release-list[0].medium-list[0].format", "media"),
    ("release-list[0].medium-list[0].track-list[0].id", "mb_releasetrackid"),
    ("release-list[0].medium-list[0].track-list[0].number", "track"),
    ("release-list[0].medium-list[0].track-list[0].title", "title"),
    ("release-list[0].medium-list[0].track-list[0].length", "length"),
    (
        "release-list[0].medium-list[0].track-list[0].track_or_recording_length",
        "length",
    ),
    ("release-list[0].medium-list[0].track-count", "tracktotal"),
    ("release-list[0].medium-track-count", "tracktotal"),
    ("release-list[0].medium-count", "disctotal"),
];

/// Deezer track search (`data` entries).
pub const DEEZER: &[(&str, &str)] = &[
    ("title", "title"),
    ("isrc", "isrc"),
    ("link", "url"),
    ("track_position", "track"),
    ("disk_number", "disc"),
    ("release_date", "date"),
    ("artist.name", "artist"),
    ("album.title", "album"),
    ("album.release_date", "date"),
    ("album.type", "albumtype"),
    ("album.label", "label"),
    ("album.nb_tracks", "tracktotal"),
    ("album.artist.name", "albumartist"),
    ("album.genres.data[0].name", "genre"),
];

/// Spotify track search (`tracks.items` entries).
pub const SPOTIFY: &[(&str, &str)] = &[
    ("name", "title"),
    ("artists[0].name", "artist"),
    ("album.name", "album"),
    ("album.album_type", "albumtype"),
    ("album.artists[0].name", "albumartist"),
    ("album.release_date", "date"),
    ("album.total_tracks", "tracktotal"),
    ("disc_number", "disc"),
    ("track_number", "track"),
    ("external_ids.isrc", "isrc"),
    ("external_urls.spotify", "url"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_unique_paths(table: &[(&str, &str)]) {
        let mut seen = HashSet::new();
        for (path, _) in table {
            assert!(seen.insert(*path), "duplicate path {path}");
        }
    }

    #[test]
    fn test_tables_have_unique_paths() {
        assert_unique_paths(MUSICBRAINZ);
        assert_unique_paths(DEEZER);
        assert_unique_paths(SPOTIFY);
    }

    #[test]
    fn test_every_table_maps_title_and_artist() {
        for table in [MUSICBRAINZ, DEEZER, SPOTIFY] {
            let fields: HashSet<&str> = table.iter().map(|(_, f)| *f).collect();
            assert!(fields.contains("title"));
            assert!(fields.contains("artist"));
            assert!(fields.contains("album"));
        }
    }

    #[test]
    fn test_musicbrainz_album_has_multiple_sources() {
        let album_paths = MUSICBRAINZ.iter().filter(|(_, f)| *f == "album").count();
        assert_eq!(album_paths, 2);
    }

    #[test]
    fn test_musicbrainz_reads_release_events_and_length() {
        let fields: HashSet<&str> = MUSICBRAINZ
            .iter()
            .filter(|(path, _)| path.contains("release-event-list") || path.ends_with("length"))
            .map(|(_, f)| *f)
            .collect();
        assert_eq!(fields, HashSet::from(["date", "country", "length"]));
    }
}
