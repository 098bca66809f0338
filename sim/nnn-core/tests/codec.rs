use bytes::Bytes;
use nnn_core::{
    pdus::{Aen, Den, Do, Du, En, EnFamily, Inf, Mdo, Nullp, Oen, Ren, So},
    wire::BuildError,
    Address, Name, NnnPdu, Pdu, PduType, WireFormat,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::time::Duration;

fn name(s: &str) -> Name {
    s.parse().unwrap()
}

fn mac(s: &str) -> Address {
    s.parse().unwrap()
}

fn den_example() -> Den {
    let mut den = Den::new();
    den.set_name(name("ae.34.24"));
    den.set_lifetime(Duration::from_secs(20));
    den.add_poa(mac("01:B2:03:04:05:06"));
    den.add_poa(mac("01:02:03:04:05:06"));
    den
}

#[test]
fn den_round_trip() -> anyhow::Result<()> {
    let den = den_example();
    let wire = den.to_wire()?;
    let parsed = Den::from_wire(wire)?;

    assert_eq!(parsed.name()?, &name("ae.34.24"));
    assert_eq!(parsed.lifetime(), Duration::from_secs(20));
    assert_eq!(
        parsed.poas(),
        &[mac("01:b2:03:04:05:06"), mac("01:02:03:04:05:06")]
    );
    assert_eq!(parsed.to_string(), den.to_string());
    Ok(())
}

/// One of every PDU type, with every field set.
fn every_pdu() -> Vec<Pdu> {
    let payload = Bytes::from_static(b"some application data");

    let mut do_pdu = Do::new();
    do_pdu.set_name(name("a.b.c"));
    do_pdu.set_payload(payload.clone());

    let mut so = So::new();
    so.set_name(name("src"));
    so.set_payload_type(0);
    so.set_payload(payload.clone());

    let mut du = Du::new();
    du.set_src_name(name("a.b"));
    du.set_dst_name(name("c.d.e"));
    du.set_payload(payload.clone());

    let mut nullp = Nullp::new();
    nullp.set_payload(payload.clone());

    let mut mdo = Mdo::new();
    mdo.add_destinations(&[name("s.t.1"), name("s.t.2"), name("u.3")]);
    mdo.set_payload(payload);

    let mut en = En::new();
    en.add_poas([mac("01:02:03:04:05:06"), mac("01:02:03:04:05:07")]);

    let mut aen = Aen::new();
    aen.add_poa(Address::new(4, vec![10, 0, 0, 1]).unwrap());
    aen.set_lease(Duration::from_secs(3600));
    aen.set_name(name("granted.1"));

    let mut oen = Oen::new();
    oen.add_poa(mac("0a:00:00:00:00:01"));
    oen.set_lease(Duration::from_secs(600));
    oen.set_name(name("offered.2"));
    oen.add_personal_poa(mac("0a:00:00:00:00:02"));
    oen.set_src_name(name("offerer"));

    let mut ren = Ren::new();
    ren.add_poa(mac("0a:00:00:00:00:03"));
    ren.set_remaining_lease(Duration::from_secs(90));
    ren.set_name(name("renew.me"));

    let mut inf = Inf::new();
    inf.set_remaining_lease(Duration::from_secs(45));
    inf.set_old_name(name("old.place"));
    inf.set_new_name(name("new.place"));

    vec![
        do_pdu.into(),
        so.into(),
        du.into(),
        nullp.into(),
        mdo.into(),
        en.into(),
        aen.into(),
        oen.into(),
        ren.into(),
        den_example().into(),
        inf.into(),
    ]
}

#[test]
fn every_type_round_trips() -> anyhow::Result<()> {
    for pdu in every_pdu() {
        let wire = pdu.to_wire()?;
        let parsed = Pdu::from_wire(wire.clone())?;
        assert_eq!(parsed, pdu, "{} did not survive the round trip", pdu.packet_type());
        assert_eq!(parsed.to_string(), pdu.to_string());
        assert_eq!(parsed.wire(), Some(wire));
    }
    Ok(())
}

#[test]
fn every_type_reports_its_size() -> anyhow::Result<()> {
    for pdu in every_pdu() {
        let wire = pdu.to_wire()?;
        let declared = u16::from_be_bytes([wire[8], wire[9]]) as usize;
        assert_eq!(declared, pdu.serialized_size());
        assert!(wire.len() >= declared);
    }
    Ok(())
}

#[test]
fn to_wire_is_stable() -> anyhow::Result<()> {
    for pdu in every_pdu() {
        let first = pdu.to_wire()?;
        let second = pdu.to_wire()?;
        assert_eq!(first, second);
        assert_eq!(first.as_ptr(), second.as_ptr());
    }
    Ok(())
}

#[test]
fn setters_change_the_wire() -> anyhow::Result<()> {
    let mut den = den_example();
    let before = den.to_wire()?;
    den.add_poa(mac("01:02:03:04:05:08"));
    let after = den.to_wire()?;
    assert_ne!(before, after);
    assert_eq!(after.len(), before.len() + 8);

    let mut inf = Inf::new();
    inf.set_old_name(name("a"));
    inf.set_new_name(name("b"));
    let before = inf.to_wire()?;
    inf.set_new_name(name("c"));
    assert_ne!(before, inf.to_wire()?);
    Ok(())
}

#[test]
fn sizes_match_with_any_number_of_poas() -> anyhow::Result<()> {
    for count in [0usize, 1, 2, 17] {
        let mut en = En::new();
        let mut ren = Ren::new();
        ren.set_name(name("r"));
        let mut aen = Aen::new();
        aen.set_name(name("a"));
        for i in 0..count {
            let poa = Address::from_u48(0x0100_0000_0000 + i as u64);
            en.add_poa(poa.clone());
            ren.add_poa(poa.clone());
            aen.add_poa(poa);
        }

        let wire = en.to_wire()?;
        assert_eq!(wire.len(), en.serialized_size());
        assert_eq!(En::from_wire(wire)?.num_poas(), count);

        let wire = ren.to_wire()?;
        assert_eq!(wire.len(), ren.serialized_size());
        assert_eq!(Ren::from_wire(wire)?.poas(), ren.poas());

        let wire = aen.to_wire()?;
        assert_eq!(wire.len(), aen.serialized_size());
        assert_eq!(Aen::from_wire(wire)?.poas(), aen.poas());
    }
    Ok(())
}

#[test]
fn clones_do_not_share_the_cache() -> anyhow::Result<()> {
    let den = den_example();
    let wire = den.to_wire()?;

    let mut copy = den.clone();
    assert_eq!(copy.wire(), None);
    copy.set_name(name("other"));
    assert_eq!(den.name()?, &name("ae.34.24"));
    assert_eq!(den.to_wire()?, wire);

    let forwarded = den.clone_with_wire();
    assert_eq!(forwarded.wire(), Some(wire));
    Ok(())
}

#[test]
fn truncated_input_is_rejected() -> anyhow::Result<()> {
    for pdu in every_pdu() {
        let wire = pdu.to_wire()?;
        let body_end = pdu.serialized_size();
        for cut in [0, 3, 9, body_end - 1] {
            assert!(
                Pdu::from_wire(wire.slice(..cut)).is_err(),
                "{} parsed from {} of {} bytes",
                pdu.packet_type(),
                cut,
                body_end
            );
        }
    }
    Ok(())
}

#[test]
fn failed_serialize_leaves_output_alone() -> anyhow::Result<()> {
    let mut oen = Oen::new();
    oen.set_name(name("offered"));
    oen.set_src_name(name("offerer"));
    oen.add_poa(Address::new(3, vec![1, 2, 3])?);

    let mut out = vec![0xAA];
    assert_eq!(
        oen.serialize(&mut out),
        Err(BuildError::UnsupportedPoa(PduType::Oen))
    );
    assert_eq!(out, [0xAA]);

    let mut den = den_example();
    den.set_name(name("fine"));
    den.serialize(&mut out)?;
    assert_eq!(out.len(), 1 + den.serialized_size());
    Ok(())
}

#[test]
fn dispatches_on_packet_type() -> anyhow::Result<()> {
    let wire = den_example().to_wire()?;
    assert_eq!(Pdu::from_wire(wire)?.packet_type(), PduType::Den);

    let mut inf = Inf::new();
    inf.set_old_name(name("a"));
    inf.set_new_name(name("b"));
    let pdu = Pdu::from_wire(inf.to_wire()?)?;
    assert_eq!(pdu.forwarding_name(), Some(&name("b")));
    Ok(())
}

fn random_name(rng: &mut SmallRng) -> Name {
    let len = rng.gen_range(1..5);
    // A small alphabet, so that destinations often share a sector
    let labels: Vec<String> = (0..len)
        .map(|_| char::from(b'a' + rng.gen_range(0..4u8)).to_string())
        .collect();
    Name::from_labels(labels.iter().map(String::as_str))
}

#[test]
fn mdo_counts_follow_destinations() -> anyhow::Result<()> {
    let mut rng = SmallRng::seed_from_u64(0x4e4e4e);
    for _ in 0..200 {
        let mut mdo = Mdo::new();
        let destinations: Vec<Name> = (0..rng.gen_range(0..20))
            .map(|_| random_name(&mut rng))
            .collect();
        for (i, destination) in destinations.iter().enumerate() {
            mdo.add_destination(destination);
            let per_sector: usize = mdo.sectors().map(|(_, addresses)| addresses.len()).sum();
            assert_eq!(mdo.num_total_destinations(), i + 1);
            assert_eq!(mdo.num_total_destinations(), per_sector);
            assert_eq!(mdo.num_distinct_destinations(), mdo.sectors().len());
        }

        let mut expected = destinations.clone();
        expected.sort();
        let mut found: Vec<Name> = mdo.destinations().collect();
        found.sort();
        assert_eq!(found, expected);

        let parsed = Mdo::from_wire(mdo.to_wire()?)?;
        assert_eq!(parsed, mdo);
        assert_eq!(parsed.num_total_destinations(), destinations.len());
    }
    Ok(())
}
