//! Standard RDF namespace URI constants
//!
//! Compile-time verified namespace URIs used throughout the crate,
//! eliminating string typos in well-known vocabulary terms.

/// RDF namespace
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// RDF Schema namespace
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
/// XML Schema Datatypes namespace
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// `rdf:type`, the resolution of the `a` shorthand
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
/// `rdf:first`, head slot of a desugared collection cell
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
/// `rdf:rest`, tail slot of a desugared collection cell
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
/// `rdf:nil`, the empty collection
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

/// `xsd:string`, the implicit literal datatype (never stored explicitly)
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
/// `xsd:integer`
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
/// `xsd:decimal`
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
/// `xsd:double`
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
/// `xsd:boolean`
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

/// Construct a full URI from a namespace and a local name.
#[inline]
pub fn uri(namespace: &str, local: &str) -> String {
    format!("{}{}", namespace, local)
}

/// Check whether a URI belongs to a namespace.
#[inline]
pub fn in_namespace(uri: &str, namespace: &str) -> bool {
    uri.starts_with(namespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_helper() {
        assert_eq!(uri(XSD, "integer"), XSD_INTEGER);
        assert_eq!(uri(RDF, "nil"), RDF_NIL);
    }

    #[test]
    fn test_in_namespace() {
        assert!(in_namespace(RDF_TYPE, RDF));
        assert!(!in_namespace(RDF_TYPE, XSD));
    }
}
