// Drive a two-channel generator against the recording mock transport
//
// Shows the calls a driver makes without any hardware attached.

use ivi_rs::mock::MockInstrument;
use ivi_rs::models::Keysight33500Fgen;
use ivi_rs::{IviError, TransportError};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("IVI Mock Session Example");
    println!("========================\n");

    let mock = Arc::new(MockInstrument::new());
    mock.reply("*IDN?", "Keysight Technologies,33522B,MY00000001,4.00");
    mock.reply("*TST?", "0");
    mock.reply("SYST:ERR?", "+0,\"No error\"");

    // 1. Construct without reset: nothing is sent
    let fgen = Keysight33500Fgen::new(Arc::clone(&mock), false).map_err(|(_, e)| e)?;
    println!("1. Constructed {} with {} outputs", fgen.description(), fgen.output_count());
    println!("   Calls so far: {:?}\n", mock.calls());

    // 2. Common commands
    println!("2. Instrument: {}", fgen.identify()?);
    println!("   {}", fgen.self_test()?.message);
    println!("   Error queue: {}\n", fgen.error_query()?);

    // 3. Channel-scoped commands share the transport
    for channel in fgen.channels() {
        channel.send(&format!("OUTP{} ON", channel.id() + 1))?;
    }
    println!("3. Sent: {:?}\n", mock.sent_commands());

    // 4. A failed reset on construction still yields a driver
    mock.clear_calls();
    mock.fail_next_send(TransportError::Disconnected);
    match Keysight33500Fgen::new(Arc::clone(&mock), true) {
        Ok(_) => println!("4. Reset succeeded"),
        Err((fgen, IviError::Communication(e))) => {
            println!("4. Reset failed ({e}), driver still has {} outputs", fgen.output_count());
        }
        Err((_, e)) => return Err(e.into()),
    }
    println!("   Calls: {:?}", mock.calls());

    Ok(())
}
