mod country;
pub use self::country::CountryRecord;

mod insights;
pub use self::insights::{Insights, Prediction, PredictionRequest};

mod geo;
pub use self::geo::{Feature, FeatureCollection, FeatureProperties};
