//! Shared helpers for unit tests.

use const_oid::db::rfc5912::{SECP_256_R_1, SECP_384_R_1};
use der::asn1::{Any, OctetString};
use der::{Decode, Encode, Tag};
use keybox_core::KeyAlgorithm;
use rcgen::{
    CertificateParams, CustomExtension, DistinguishedName, DnType, KeyPair, KeyUsagePurpose,
    SerialNumber, PKCS_ECDSA_P256_SHA256,
};
use x509_cert::Certificate;

use crate::attestation::{ExplicitTagged, RootOfTrust, ROOT_OF_TRUST_TAG};
use crate::codec::decode_key_or_cert;
use crate::keybox::{KeyMaterial, Keybox};
use crate::signer::PrivateKey;

pub const KEYBOX_YAML: &str = include_str!("../tests/fixtures/keybox.yaml");
pub const EC_LEAF_PEM: &str = include_str!("../tests/fixtures/ec_leaf.pem");
pub const RSA_LEAF_PEM: &str = include_str!("../tests/fixtures/rsa_leaf.pem");
pub const RSA_KEY_PEM: &str = include_str!("../tests/fixtures/rsa_key.pem");

pub const CHALLENGE: &[u8] = b"keybox-challenge";
const ATTESTATION_OID_ARCS: &[u64] = &[1, 3, 6, 1, 4, 1, 11129, 2, 1, 17];
const ATTESTATION_APPLICATION_ID_TAG: u32 = 709;

/// SEC1 `ECPrivateKey` naming `curve`, as carried in keybox files.
fn sec1_key(curve: der::asn1::ObjectIdentifier, scalar: &[u8], public: &[u8]) -> Vec<u8> {
    sec1::EcPrivateKey {
        private_key: scalar,
        parameters: Some(sec1::EcParameters::NamedCurve(curve)),
        public_key: Some(public),
    }
    .to_der()
    .unwrap()
}

/// Fresh P-256 key as (SEC1 DER, uncompressed public point).
pub fn p256_sec1_key() -> (Vec<u8>, Vec<u8>) {
    use p256::elliptic_curve::sec1::ToEncodedPoint;

    let secret = p256::SecretKey::random(&mut rand::rngs::OsRng);
    let public = secret.public_key().to_encoded_point(false).as_bytes().to_vec();
    let sec1 = sec1_key(SECP_256_R_1, &secret.to_bytes(), &public);
    (sec1, public)
}

/// Fresh P-384 key as (SEC1 DER, uncompressed public point).
pub fn p384_sec1_key() -> (Vec<u8>, Vec<u8>) {
    use p384::elliptic_curve::sec1::ToEncodedPoint;

    let secret = p384::SecretKey::random(&mut rand::rngs::OsRng);
    let public = secret.public_key().to_encoded_point(false).as_bytes().to_vec();
    let sec1 = sec1_key(SECP_384_R_1, &secret.to_bytes(), &public);
    (sec1, public)
}

pub fn fixture_rsa_key() -> PrivateKey {
    PrivateKey::from_pkcs8_der(&decode_key_or_cert(RSA_KEY_PEM).unwrap()).unwrap()
}

pub fn fixture_keybox() -> Keybox {
    Keybox::from_yaml_str(KEYBOX_YAML).unwrap()
}

pub fn fixture_keybox_material(algorithm: KeyAlgorithm) -> KeyMaterial {
    KeyMaterial::load(&fixture_keybox(), algorithm).unwrap()
}

/// `[tag] EXPLICIT INTEGER value`
pub fn integer_entry(tag: u32, value: u32) -> Vec<u8> {
    ExplicitTagged::new(tag, &value).to_der().unwrap()
}

/// `[704] EXPLICIT RootOfTrust`
pub fn root_of_trust_entry(rot: &RootOfTrust) -> Vec<u8> {
    ExplicitTagged::new(ROOT_OF_TRUST_TAG, rot).to_der().unwrap()
}

fn sequence(content: Vec<u8>) -> Vec<u8> {
    Any::new(Tag::Sequence, content).unwrap().to_der().unwrap()
}

fn enumerated(value: u8) -> Vec<u8> {
    vec![0x0a, 0x01, value]
}

/// The eight top-level Key Description elements, TEE list built from `tee`.
fn key_description_elements(tee: &[Vec<u8>]) -> Vec<Vec<u8>> {
    let app_id = OctetString::new(b"com.example.app".to_vec()).unwrap();
    let software = ExplicitTagged::new(ATTESTATION_APPLICATION_ID_TAG, &app_id)
        .to_der()
        .unwrap();

    vec![
        300u32.to_der().unwrap(),
        enumerated(1),
        300u32.to_der().unwrap(),
        enumerated(1),
        OctetString::new(CHALLENGE.to_vec()).unwrap().to_der().unwrap(),
        OctetString::new(Vec::new()).unwrap().to_der().unwrap(),
        sequence(software),
        sequence(tee.concat()),
    ]
}

/// Key Description payload whose TEE-enforced list holds `tee` in order.
pub fn key_description(tee: &[Vec<u8>]) -> Vec<u8> {
    sequence(key_description_elements(tee).concat())
}

/// Key Description truncated to its first `count` elements.
pub fn short_key_description(count: usize) -> Vec<u8> {
    let elements = key_description_elements(&[]);
    sequence(elements[..count].concat())
}

/// Key Description whose element 7 is `element` verbatim.
pub fn key_description_with_tee_element(element: Vec<u8>) -> Vec<u8> {
    let mut elements = key_description_elements(&[]);
    elements[7] = element;
    sequence(elements.concat())
}

fn leaf_params(common_name: &str) -> CertificateParams {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn.push(DnType::OrganizationName, "Keybox Test Device");
    params.distinguished_name = dn;
    params.serial_number = Some(SerialNumber::from_slice(&[0x01, 0x23, 0x45, 0x67]));
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params
}

/// Self-signed P-256 leaf carrying `payload` as its attestation extension.
pub fn attested_leaf(payload: &[u8]) -> Certificate {
    let key = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256).unwrap();
    let mut params = leaf_params("Android Keystore Key");
    params
        .custom_extensions
        .push(CustomExtension::from_oid_content(ATTESTATION_OID_ARCS, payload.to_vec()));
    let cert = params.self_signed(&key).unwrap();
    Certificate::from_der(cert.der()).unwrap()
}

/// Self-signed P-256 leaf without an attestation extension.
pub fn plain_leaf() -> Certificate {
    let key = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256).unwrap();
    let cert = leaf_params("Plain Key").self_signed(&key).unwrap();
    Certificate::from_der(cert.der()).unwrap()
}
