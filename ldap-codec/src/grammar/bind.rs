//! BindRequest and BindResponse
//!
//! ```text
//! BindRequest ::= [APPLICATION 0] SEQUENCE {
//!      version         INTEGER (1 ..  127),
//!      name            LDAPDN,
//!      authentication  AuthenticationChoice }
//!
//! AuthenticationChoice ::= CHOICE {
//!      simple  [0] OCTET STRING,
//!      sasl    [3] SaslCredentials }
//!
//! BindResponse ::= [APPLICATION 1] SEQUENCE {
//!      COMPONENTS OF LDAPResult,
//!      serverSaslCreds    [7] OCTET STRING OPTIONAL }
//! ```

use ldap_asn1::Transition;
use ldap_asn1::ber::decoder::decode_int_in_range;
use ldap_asn1::ber::types::tags;

use super::envelope::add_controls_from;
use super::result::{BIND_RESULT, add_ldap_result};
use super::{
    LdapGrammarBuilder, LdapState as S, check_dn, current_bytes, current_string, op_mut,
    set_protocol_op,
};
use crate::constants::{MAX_PROTOCOL_VERSION, context_tags, op_tags};
use crate::container::LdapMessageContainer;
use crate::error::{DecodeResult, DecoderError};
use crate::message::{BindAuthentication, BindRequest, BindResponse, ProtocolOp};

op_mut!(bind_request_mut, BindRequest, BindRequest);
op_mut!(bind_response_mut, BindResponse, BindResponse);

pub(crate) fn add_transitions(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new("BindRequest", S::MessageId, op_tags::BIND_REQUEST, S::BindRequest)
                .with_action(init_bind_request),
        )
        .add(
            Transition::new("version", S::BindRequest, tags::INTEGER, S::BindVersion)
                .with_action(store_version),
        )
        .add(
            Transition::new("name", S::BindVersion, tags::OCTET_STRING, S::BindName)
                .with_action(store_name),
        )
        .add(
            Transition::new("simple", S::BindName, context_tags::SIMPLE_AUTH, S::BindSimple)
                .optional_end()
                .with_action(store_simple),
        )
        .add(
            Transition::new("sasl", S::BindName, context_tags::SASL_AUTH, S::BindSasl)
                .with_action(init_sasl),
        )
        .add(
            Transition::new("mechanism", S::BindSasl, tags::OCTET_STRING, S::BindSaslMechanism)
                .optional_end()
                .with_action(store_sasl_mechanism),
        )
        .add(
            Transition::new(
                "credentials",
                S::BindSaslMechanism,
                tags::OCTET_STRING,
                S::BindSaslCredentials,
            )
            .optional_end()
            .with_action(store_sasl_credentials),
        );

    add_controls_from(
        builder,
        &[S::BindSimple, S::BindSaslMechanism, S::BindSaslCredentials],
    );
    builder
        .add_content(
            &[S::BindRequest],
            &[S::BindVersion, S::BindName, S::BindSimple, S::BindSasl],
        )
        .add_end(&[S::BindRequest], &[S::BindSimple, S::BindSasl])
        .add_content(&[S::BindSasl], &[S::BindSaslMechanism, S::BindSaslCredentials])
        .add_end(&[S::BindSasl], &[S::BindSaslMechanism, S::BindSaslCredentials]);

    builder.add(
        Transition::new("BindResponse", S::MessageId, op_tags::BIND_RESPONSE, S::BindResponse)
            .with_action(init_bind_response),
    );
    add_ldap_result(builder, &BIND_RESULT);
    builder.add_from_each(
        &[S::BindDiagnosticMessage, S::BindReferral],
        Transition::new(
            "serverSaslCreds",
            S::BindDiagnosticMessage,
            context_tags::SERVER_SASL_CREDS,
            S::BindServerSaslCreds,
        )
        .optional_end()
        .with_action(store_server_sasl_creds),
    );
    add_controls_from(
        builder,
        &[S::BindDiagnosticMessage, S::BindReferral, S::BindServerSaslCreds],
    );
    builder
        .add_content(&[S::BindResponse], &[S::BindServerSaslCreds])
        .add_end(&[S::BindResponse], &[S::BindServerSaslCreds]);
}

fn init_bind_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(container, ProtocolOp::BindRequest(BindRequest::default()))
}

fn store_version(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let version = decode_int_in_range(container.current_value()?, 1, MAX_PROTOCOL_VERSION)?;
    bind_request_mut(container)?.version = version;
    Ok(())
}

fn store_name(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let name = current_string(container)?;
    bind_request_mut(container)?.name = name.clone();
    check_dn(&name)
}

fn store_simple(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let password = current_bytes(container)?;
    bind_request_mut(container)?.authentication = BindAuthentication::Simple(password);
    Ok(())
}

fn init_sasl(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    bind_request_mut(container)?.authentication = BindAuthentication::Sasl {
        mechanism: String::new(),
        credentials: None,
    };
    Ok(())
}

fn sasl_mut(
    container: &mut LdapMessageContainer,
) -> DecodeResult<(&mut String, &mut Option<Vec<u8>>)> {
    match &mut bind_request_mut(container)?.authentication {
        BindAuthentication::Sasl {
            mechanism,
            credentials,
        } => Ok((mechanism, credentials)),
        BindAuthentication::Simple(_) => Err(DecoderError::invalid_value(
            "No SASL credentials under construction",
        )),
    }
}

fn store_sasl_mechanism(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_string(container)?;
    *sasl_mut(container)?.0 = value;
    Ok(())
}

fn store_sasl_credentials(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    *sasl_mut(container)?.1 = Some(value);
    Ok(())
}

fn init_bind_response(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(container, ProtocolOp::BindResponse(BindResponse::default()))
}

fn store_server_sasl_creds(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let creds = current_bytes(container)?;
    bind_response_mut(container)?.server_sasl_creds = Some(creds);
    Ok(())
}
