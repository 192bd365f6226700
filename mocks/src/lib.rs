//! mocks - test doubles for exercising the Iu adaptation layer end-to-end.

mod mock_rnc;

pub use mock_rnc::MockRnc;
