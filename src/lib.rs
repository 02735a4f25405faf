// TODO:
// - TransferFaces and TransferExtendedEdge share most of their lock-step walk; extract
//   the recursion scheme into a helper once a third variant shows up
// - put_cube only value-compares leaves to avoid allocation; branches could get a
//   shallow child-identity comparison as well
// - expand_model could accept an IntoIterator of points instead of a slice

pub mod cube;
pub mod spatial;
