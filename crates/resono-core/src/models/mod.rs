pub mod analytics;
pub mod features;
pub mod listen;
pub mod track;
pub mod wave;

pub use analytics::{
    CountryListeners, DayPeriod, DayPeriodShare, GeographyData, GlobalStatistics, RetentionPoint,
    SegmentIntensity, TrackStatistics,
};
pub use features::AudioFeatures;
pub use listen::{ListenPartInput, ListenerId, NewListen};
pub use track::{ScoredTrack, Track, TrackAuthor};
pub use wave::WaveRequest;
