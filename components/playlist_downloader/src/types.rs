// components/playlist_downloader/src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of a resolved playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    pub title: String,
}

impl PlaylistItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Which streams a downloaded file should contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFilter {
    #[default]
    AudioAndVideo,
    Video,
    VideoOnly,
    Audio,
    AudioOnly,
}

impl MediaFilter {
    pub const ALL: [MediaFilter; 5] = [
        MediaFilter::AudioAndVideo,
        MediaFilter::Video,
        MediaFilter::VideoOnly,
        MediaFilter::Audio,
        MediaFilter::AudioOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFilter::AudioAndVideo => "audioandvideo",
            MediaFilter::Video => "video",
            MediaFilter::VideoOnly => "videoonly",
            MediaFilter::Audio => "audio",
            MediaFilter::AudioOnly => "audioonly",
        }
    }

    pub fn includes_video(&self) -> bool {
        self.as_str().contains("video")
    }

    /// Container extension for files downloaded with this filter
    pub fn extension(&self) -> &'static str {
        if self.includes_video() { "mp4" } else { "mp3" }
    }
}

impl fmt::Display for MediaFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown filter '{s}' (expected one of: {})",
                    MediaFilter::ALL.map(|f| f.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaQuality {
    #[default]
    HighestAudio,
    HighestVideo,
    LowestAudio,
    LowestVideo,
    Highest,
    Lowest,
}

impl MediaQuality {
    pub const ALL: [MediaQuality; 6] = [
        MediaQuality::HighestAudio,
        MediaQuality::HighestVideo,
        MediaQuality::LowestAudio,
        MediaQuality::LowestVideo,
        MediaQuality::Highest,
        MediaQuality::Lowest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaQuality::HighestAudio => "highestaudio",
            MediaQuality::HighestVideo => "highestvideo",
            MediaQuality::LowestAudio => "lowestaudio",
            MediaQuality::LowestVideo => "lowestvideo",
            MediaQuality::Highest => "highest",
            MediaQuality::Lowest => "lowest",
        }
    }

    fn prefers_best(&self) -> bool {
        matches!(
            self,
            MediaQuality::HighestAudio | MediaQuality::HighestVideo | MediaQuality::Highest
        )
    }
}

impl fmt::Display for MediaQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaQuality::ALL
            .into_iter()
            .find(|quality| quality.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown quality '{s}' (expected one of: {})",
                    MediaQuality::ALL.map(|q| q.as_str()).join(", ")
                )
            })
    }
}

/// Filter and quality, translated into a yt-dlp format request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatSelector {
    pub filter: MediaFilter,
    pub quality: MediaQuality,
}

impl FormatSelector {
    pub fn new(filter: MediaFilter, quality: MediaQuality) -> Self {
        Self { filter, quality }
    }

    /// Value for yt-dlp's `-f` option
    pub fn format_spec(&self) -> String {
        let rank = if self.quality.prefers_best() { "b" } else { "w" };
        let streams = match self.filter {
            MediaFilter::AudioAndVideo => "",
            MediaFilter::AudioOnly => "a",
            MediaFilter::VideoOnly => "v",
            MediaFilter::Audio => "a*",
            MediaFilter::Video => "v*",
        };
        format!("{rank}{streams}")
    }

    /// Value for yt-dlp's `-S` option, if the quality ranks by a specific stream
    pub fn sort_key(&self) -> Option<&'static str> {
        match self.quality {
            MediaQuality::HighestAudio | MediaQuality::LowestAudio => Some("abr"),
            MediaQuality::HighestVideo | MediaQuality::LowestVideo => Some("res"),
            MediaQuality::Highest | MediaQuality::Lowest => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        self.filter.extension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MediaFilter::AudioAndVideo, "mp4")]
    #[case(MediaFilter::Video, "mp4")]
    #[case(MediaFilter::VideoOnly, "mp4")]
    #[case(MediaFilter::Audio, "mp3")]
    #[case(MediaFilter::AudioOnly, "mp3")]
    fn extension_follows_video_in_filter_name(#[case] filter: MediaFilter, #[case] ext: &str) {
        assert_eq!(filter.extension(), ext);
    }

    #[rstest]
    #[case(MediaFilter::AudioAndVideo, MediaQuality::HighestAudio, "b", Some("abr"))]
    #[case(MediaFilter::AudioOnly, MediaQuality::Highest, "ba", None)]
    #[case(MediaFilter::VideoOnly, MediaQuality::LowestVideo, "wv", Some("res"))]
    #[case(MediaFilter::Audio, MediaQuality::Lowest, "wa*", None)]
    #[case(MediaFilter::Video, MediaQuality::HighestVideo, "bv*", Some("res"))]
    fn selector_maps_to_ytdlp_format(
        #[case] filter: MediaFilter,
        #[case] quality: MediaQuality,
        #[case] spec: &str,
        #[case] sort: Option<&str>,
    ) {
        let selector = FormatSelector::new(filter, quality);
        assert_eq!(selector.format_spec(), spec);
        assert_eq!(selector.sort_key(), sort);
    }

    #[test]
    fn filters_and_qualities_parse_from_their_names() {
        for filter in MediaFilter::ALL {
            assert_eq!(filter.as_str().parse::<MediaFilter>(), Ok(filter));
        }
        for quality in MediaQuality::ALL {
            assert_eq!(quality.as_str().parse::<MediaQuality>(), Ok(quality));
        }
    }

    #[test]
    fn unknown_filter_lists_the_accepted_values() {
        let err = "mp3".parse::<MediaFilter>().unwrap_err();
        assert!(err.contains("audioandvideo"), "unexpected message: {err}");
    }

    #[test]
    fn defaults_match_cli_defaults() {
        let selector = FormatSelector::default();
        assert_eq!(selector.filter, MediaFilter::AudioAndVideo);
        assert_eq!(selector.quality, MediaQuality::HighestAudio);
    }
}
